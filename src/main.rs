use clap::{Parser, Subcommand};
use pagesmith::content::{MarkdownContent, Renderable};
use pagesmith::context::{ContextType, RenderContext};
use pagesmith::template::{Params, SiteTemplate};
use pagesmith::util::inflector::Inflector;
use pagesmith::util::number::{self, BytePrefix};
use pagesmith::util::url::Url;
use pagesmith::{config, output};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pagesmith")]
#[command(about = "Server-side HTML/XHTML page assembly")]
#[command(long_about = "\
Server-side HTML/XHTML page assembly

Pages are rendered against a profile (doctype, content type, XML syntax) and
a chrome that collects everything going into <head>: title, meta, scripts,
stylesheets and icons, sorted by priority with IE-only resources grouped
into conditional comments.

Configuration is read from pagesmith.toml. Pass --config-dir more than once
to layer directories, outermost first:

  pagesmith --config-dir site --config-dir site/blog plan

Run 'pagesmith gen-config' to generate a documented pagesmith.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding pagesmith.toml (repeat to layer, outermost first)
    #[arg(long = "config-dir", global = true)]
    config_dirs: Vec<PathBuf>,

    /// Override the render profile, e.g. xhtml-1.0-strict
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the response head and document head for the configured page
    Head,
    /// Show doctype, content type and syntax facts for a profile
    Doctype {
        /// Profile name, e.g. html-4.01-strict
        name: String,
    },
    /// Show the head load plan: resources in emission order
    Plan,
    /// Render a markdown file as a full page
    Page {
        /// Markdown source
        source: PathBuf,
        /// Body template to render through
        #[arg(long, default_value = "default")]
        template: String,
        /// Title part prepended to the configured title
        #[arg(long)]
        title: Option<String>,
    },
    /// Resolve a URL against the current page URL
    Url {
        /// Target URL or shorthand (`#frag`, `?q=1`, `&k=v`, `/path`)
        target: String,
        /// Current page URL
        #[arg(long)]
        current: String,
        /// Emit the shortest reference that reaches the target
        #[arg(long)]
        minimal: bool,
    },
    /// Pluralize a word
    Pluralize {
        word: String,
        /// Return the inflected form in lower case
        #[arg(long)]
        no_fix_case: bool,
    },
    /// Singularize a word
    Singularize {
        word: String,
        /// Return the inflected form in lower case
        #[arg(long)]
        no_fix_case: bool,
    },
    /// Format a byte count, or parse a size such as 10M
    Bytes {
        size: String,
        /// Digits after the decimal point
        #[arg(long, default_value_t = 2)]
        precision: usize,
        /// Print only the SI (power of 1000) form
        #[arg(long)]
        decimal: bool,
    },
    /// Print a stock pagesmith.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Head => {
            let site = load_site(&cli.config_dirs, cli.profile.as_deref())?;
            let ctx = site.context()?;
            let rendered = site.chrome()?.render(&ctx)?;
            output::print_rendered_head(&rendered.response, &rendered.markup);
        }
        Command::Doctype { name } => {
            let kind: ContextType = name.parse()?;
            output::print_doctype(kind, &RenderContext::create(kind))?;
        }
        Command::Plan => {
            let site = load_site(&cli.config_dirs, cli.profile.as_deref())?;
            let ctx = site.context()?;
            output::print_plan(&site.chrome()?, &ctx);
        }
        Command::Page {
            source,
            template,
            title,
        } => {
            let site = load_site(&cli.config_dirs, cli.profile.as_deref())?;
            let ctx = site.context()?;
            let mut chrome = site.chrome()?;
            if let Some(title) = title {
                chrome.prepend_title(title);
            }
            let markdown = std::fs::read_to_string(&source)?;
            let body = MarkdownContent::new(markdown).render(&ctx)?.into_string();
            // `default` reads `content`, the layouts read `main`
            let mut params = Params::new();
            params.insert("content".into(), body.clone().into());
            params.insert("main".into(), body.into());
            print!("{}", site.render_page(&ctx, &chrome, &template, &params)?);
        }
        Command::Url {
            target,
            current,
            minimal,
        } => {
            let current = Url::parse(&current, None)?;
            let target = Url::parse(&target, Some(&current))?;
            println!("{}", target.relative(&current, minimal));
        }
        Command::Pluralize { word, no_fix_case } => {
            println!("{}", Inflector::new().pluralize_with(&word, !no_fix_case));
        }
        Command::Singularize { word, no_fix_case } => {
            println!("{}", Inflector::new().singularize_with(&word, !no_fix_case));
        }
        Command::Bytes {
            size,
            precision,
            decimal,
        } => {
            let bytes = number::parse_bytes(&size)?;
            if decimal {
                println!("{}", number::format_bytes(bytes, BytePrefix::Decimal, precision));
            } else {
                output::print_bytes_report(bytes, precision);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the layered config (current directory when none given) and apply
/// the command-line profile override.
fn load_site(
    dirs: &[PathBuf],
    profile: Option<&str>,
) -> Result<SiteTemplate, config::ConfigError> {
    let mut site_config = if dirs.is_empty() {
        config::load_config(Path::new("."))?
    } else {
        let dirs: Vec<&Path> = dirs.iter().map(PathBuf::as_path).collect();
        config::load_layered_config(&dirs)?
    };
    if let Some(profile) = profile {
        site_config.render.profile = profile.to_string();
        site_config.validate()?;
    }
    Ok(SiteTemplate::new(site_config))
}
