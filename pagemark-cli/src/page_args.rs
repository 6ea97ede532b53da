use anyhow::{anyhow, Result};

/// A `PAGE=TAG` assignment given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTagArg {
    pub page: usize,
    pub tag: String,
}

/// clap value parser for `PAGE=TAG`.
pub fn parse_page_tag(arg: &str) -> Result<PageTagArg> {
    let (page, tag) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected PAGE=TAG, got '{arg}'"))?;
    let page: usize = page
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid page number '{}'", page.trim()))?;
    if page == 0 {
        return Err(anyhow!("pages are numbered from 1"));
    }
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(anyhow!("empty tag for page {page}"));
    }
    Ok(PageTagArg {
        page,
        tag: tag.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_tag() {
        let arg = parse_page_tag("2= Right angles ").unwrap();
        assert_eq!(arg.page, 2);
        assert_eq!(arg.tag, "Right angles");
    }

    #[test]
    fn test_tag_may_contain_equals() {
        assert_eq!(parse_page_tag("1=a=b").unwrap().tag, "a=b");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse_page_tag("Geometry").is_err());
        assert!(parse_page_tag("0=Geometry").is_err());
        assert!(parse_page_tag("x=Geometry").is_err());
        assert!(parse_page_tag("3=  ").is_err());
    }
}
