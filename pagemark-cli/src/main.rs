use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::path::Path;

// Import from pagemark-core
use pagemark_core::config::StorageBackend;
use pagemark_core::storage::save_all;
use pagemark_core::{
    AliasResolver, AnnotationSession, Axis, Category, ExportRecord, FileStorage, HttpStorage,
    NewTagCandidate, NoOcr, OcrEngine, PagemarkConfig, SidecarOcr, SuggestionEngine, TagId,
    TextFilePreprocessor, VocabularyStorage, VocabularyStore,
};

// Import CLI utilities
use pagemark::{parse_page_tag, resolve_data_dir, PageTagArg};

#[derive(Parser)]
#[command(name = "pagemark")]
#[command(about = "Tag document pages against a curated vocabulary")]
struct Cli {
    /// Path to custom config file (YAML format)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory holding tags.json, aliases.json and output.json
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Annotation server base URL; switches to the HTTP backend
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Autocomplete a partial tag
    Suggest {
        query: String,
        /// topic or vocab
        #[arg(short, long, default_value = "topic")]
        axis: String,
    },
    /// Show what a typed tag or alias resolves to
    Resolve { text: String },
    /// Tag a text-exported document and export its page index
    Annotate(AnnotateArgs),
    /// Inspect and curate tags
    #[command(subcommand)]
    Tags(TagsCommand),
    /// Inspect and curate aliases
    #[command(subcommand)]
    Aliases(AliasesCommand),
}

#[derive(clap::Args)]
struct AnnotateArgs {
    /// Text export of the document, pages separated by form feeds
    #[arg(short, long)]
    input: String,

    /// OCR text for the document in the same page layout
    #[arg(long)]
    ocr: Option<String>,

    /// Topic tag for a page, as PAGE=TAG (repeatable)
    #[arg(long, value_parser = parse_page_tag)]
    topic: Vec<PageTagArg>,

    /// Vocab tag for a page, as PAGE=TAG (repeatable)
    #[arg(long, value_parser = parse_page_tag)]
    vocab: Vec<PageTagArg>,

    /// Copy this page's tags to every page once all tags are applied
    #[arg(long)]
    copy_to_all: Option<usize>,

    /// Reading level recorded with the export
    #[arg(short, long, default_value = "")]
    level: String,

    /// Write the export record to this file
    #[arg(short, long)]
    output: Option<String>,

    /// Append the export and new tags to the data store
    #[arg(long)]
    submit: bool,
}

#[derive(Subcommand)]
enum TagsCommand {
    /// List tags
    List {
        /// predefined, vocab, custom or "custom vocab"
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive substring filter
        #[arg(long)]
        filter: Option<String>,
    },
    /// Promote a custom tag to its canonical category
    Promote { id: String },
    /// Turn a custom tag into an alias of a canonical tag
    Merge { id: String, target: String },
    /// Rename a tag
    Rename { id: String, text: String },
    /// Delete a tag (its aliases are left dangling)
    Delete { id: String },
}

#[derive(Subcommand)]
enum AliasesCommand {
    /// List aliases with their targets
    List,
    /// Change the text of an alias
    Edit { index: usize, text: String },
    /// Delete an alias
    Delete { index: usize },
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = PagemarkConfig::load_with_fallback(cli.config.as_deref());
    if let Some(config_path) = &cli.config {
        info!("📋 Loaded config from: {}", config_path);
    }
    if let Some(server) = &cli.server {
        config.storage.backend = StorageBackend::Http;
        config.storage.base_url = Some(server.clone());
    }

    let storage = open_storage(&cli, &config)?;

    match cli.command {
        Command::Suggest { query, axis } => {
            let axis: Axis = axis.parse()?;
            let store = storage.load_vocabulary()?;
            let engine = SuggestionEngine::with_limit(&store, config.suggestions.limit);
            let suggestions = engine.suggest(&query, axis);
            if suggestions.is_empty() {
                println!("🔍 No {axis} suggestions for '{query}'");
            }
            for suggestion in suggestions {
                println!("{suggestion}");
            }
        }
        Command::Resolve { text } => {
            let store = storage.load_vocabulary()?;
            let resolver = AliasResolver::new(&store);
            match resolver.find_alias(&text) {
                Some(alias) => println!(
                    "🔗 '{}' is an alias of {} -> {}",
                    text.trim(),
                    alias.id,
                    resolver.target_label(alias)
                ),
                None => println!("'{}' is not an alias", text.trim()),
            }
            println!("{}", resolver.resolve_key(&text));
        }
        Command::Annotate(args) => annotate(args, config, storage.as_ref())?,
        Command::Tags(command) => tags(command, storage.as_ref())?,
        Command::Aliases(command) => aliases(command, storage.as_ref())?,
    }

    Ok(())
}

fn open_storage(cli: &Cli, config: &PagemarkConfig) -> Result<Box<dyn VocabularyStorage>> {
    match config.storage.backend {
        StorageBackend::Http => {
            let base_url = config
                .storage
                .base_url
                .as_deref()
                .ok_or_else(|| anyhow!("storage.backend is http but no base_url is set"))?;
            info!("🌐 Using server: {}", base_url);
            Ok(Box::new(HttpStorage::new(base_url)))
        }
        StorageBackend::File => {
            let dir = resolve_data_dir(cli.data_dir.as_deref(), &config.storage.data_dir)?;
            let dir = dir
                .to_str()
                .ok_or_else(|| anyhow!("Data directory is not valid UTF-8: {}", dir.display()))?;
            info!("📁 Using data directory: {}", dir);
            Ok(Box::new(FileStorage::new(dir)?))
        }
    }
}

fn annotate(args: AnnotateArgs, config: PagemarkConfig, storage: &dyn VocabularyStorage) -> Result<()> {
    let separator = config.extraction.page_separator.clone();
    let source = TextFilePreprocessor::from_file(Path::new(&args.input), &separator)?;
    let ocr: Box<dyn OcrEngine> = match &args.ocr {
        Some(path) => Box::new(SidecarOcr::from_file(Path::new(path), &separator)?),
        None => Box::new(NoOcr),
    };
    let filename = Path::new(&args.input)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(&args.input)
        .to_string();

    let mut session = AnnotationSession::new(storage.load_vocabulary()?, config);
    println!("📄 Processing: {}", args.input);
    let pages = session.load_document(&filename, &source, ocr.as_ref())?;
    println!("   - Pages: {}", pages);

    for (axis, assignments) in [(Axis::Topic, &args.topic), (Axis::Vocab, &args.vocab)] {
        for PageTagArg { page, tag } in assignments {
            session.go_to(*page)?;
            session.add_tag(axis, tag)?;
        }
    }
    if let Some(page) = args.copy_to_all {
        session.go_to(page)?;
        session.copy_to_all()?;
        println!("📑 Copied tags of page {} to all pages", page);
    }

    let (record, candidates) = if args.submit {
        let report = session.submit(storage, &args.level)?;
        println!("✅ Export appended");
        if !report.added.is_empty() {
            println!("🏷️  Added {} new tag(s):", report.added.len());
            for tag in &report.added {
                println!("   - {} {} ({})", tag.id, tag.string, tag.category);
            }
        }
        (report.record, report.candidates)
    } else {
        session.export(&args.level)?
    };

    match &args.output {
        Some(path) => {
            save_record(&record, path)?;
            println!("💾 Export saved to: {}", path);
        }
        None if !args.submit => println!("{}", serde_json::to_string_pretty(&record)?),
        None => {}
    }
    if !args.submit {
        print_candidates(&candidates);
    }
    Ok(())
}

fn save_record(record: &ExportRecord, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {path}"))
}

fn print_candidates(candidates: &[NewTagCandidate]) {
    if candidates.is_empty() {
        return;
    }
    println!("🆕 {} tag(s) not in the vocabulary yet:", candidates.len());
    for candidate in candidates {
        println!("   - {} ({})", candidate.string, candidate.category);
    }
}

fn tags(command: TagsCommand, storage: &dyn VocabularyStorage) -> Result<()> {
    let mut store = storage.load_vocabulary()?;

    match command {
        TagsCommand::List { category, filter } => {
            let category: Option<Category> = category.as_deref().map(str::parse::<Category>).transpose()?;
            let filter = filter.unwrap_or_default().to_lowercase();
            let listed: Vec<_> = store
                .list_tags(category)
                .into_iter()
                .filter(|t| t.string.to_lowercase().contains(&filter))
                .collect();
            println!("📊 {} tag(s)", listed.len());
            for tag in listed {
                println!("{:>6}  {:<13} {}", tag.id.to_string(), tag.category.to_string(), tag.string);
            }
            return Ok(());
        }
        TagsCommand::Promote { id } => {
            let new_id = store.promote(id.parse()?)?;
            println!("⬆️  Promoted {} -> {}", id, new_id);
        }
        TagsCommand::Merge { id, target } => {
            let alias = store.merge_into_alias(id.parse()?, target.parse()?)?;
            println!("🔗 '{}' is now an alias of {}", alias.alias, alias.id);
        }
        TagsCommand::Rename { id, text } => {
            store.rename_tag(id.parse()?, &text)?;
            println!("✏️  Renamed {} to '{}'", id, text.trim());
        }
        TagsCommand::Delete { id } => {
            let id: TagId = id.parse()?;
            let removed = store.delete_tag(id)?;
            println!("🗑️  Deleted {} '{}'", id, removed.string);
        }
    }

    persist(&store, storage)
}

fn aliases(command: AliasesCommand, storage: &dyn VocabularyStorage) -> Result<()> {
    let mut store = storage.load_vocabulary()?;

    match command {
        AliasesCommand::List => {
            let resolver = AliasResolver::new(&store);
            println!("📊 {} alias(es)", store.list_aliases().len());
            for (index, alias) in store.list_aliases().iter().enumerate() {
                println!(
                    "{:>4}  {} -> {}",
                    index,
                    alias.alias,
                    resolver.target_label(alias)
                );
            }
            return Ok(());
        }
        AliasesCommand::Edit { index, text } => {
            store.edit_alias(index, &text)?;
            println!("✏️  Alias {} is now '{}'", index, text.trim());
        }
        AliasesCommand::Delete { index } => {
            let removed = store.delete_alias(index)?;
            println!("🗑️  Deleted alias '{}'", removed.alias);
        }
    }

    persist(&store, storage)
}

fn persist(store: &VocabularyStore, storage: &dyn VocabularyStorage) -> Result<()> {
    let updated = save_all(store, storage)?;
    if updated > 0 {
        println!("💾 Saved ({} exported tag(s) re-canonicalized)", updated);
    } else {
        println!("💾 Saved");
    }
    Ok(())
}
