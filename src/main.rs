use clap::{ Parser, Subcommand, ValueEnum };
use log::{ debug, warn };
use madin::utils::constants::{ APP_DESCRIPTION_SHORT, APP_NAME };
use madin::utils::logger;
use madin::{
    format_relative_time,
    format_relative_time_at,
    scroll_percentage,
    AppConfig,
    FontSizeSwitcher,
    JsonFileStorage,
    ScrollMetrics,
    StaticPreference,
    ThemeToggle,
    Timestamp,
    VirtualDocument,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

#[derive(Parser, Debug)]
#[command(name = APP_NAME, version, about = APP_DESCRIPTION_SHORT)]
struct Cli {
    /// JSON file standing in for the browser's client storage
    #[arg(long, global = true, env = "MADIN_STORE")]
    store: Option<PathBuf>,

    /// Behave as if the OS asked for a dark color scheme
    #[arg(long, global = true)]
    prefers_dark: bool,

    /// Debug logging and a dump of the page root after each command
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Describe how long ago a timestamp was (RFC 3339 or epoch milliseconds)
    Ago {
        timestamp: String,
        /// Reference instant instead of the system clock
        #[arg(long)]
        now: Option<String>,
    },
    /// Show or switch the color theme
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,
    },
    /// Show or cycle the root font size
    FontSize {
        #[arg(value_enum, default_value_t = FontSizeAction::Show)]
        action: FontSizeAction,
    },
    /// Percentage scrolled for the given page geometry
    Scroll {
        scroll_top: f64,
        scroll_height: f64,
        client_height: f64,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeAction {
    Show,
    Toggle,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FontSizeAction {
    Show,
    Cycle,
}

/// Page state shared by the theme and font-size commands
struct Page {
    document: VirtualDocument,
    storage: Rc<JsonFileStorage>,
    preference: StaticPreference,
}

impl Page {
    fn open(store: Option<PathBuf>, prefers_dark: bool) -> Self {
        let config = AppConfig::load();
        let store_path = store.unwrap_or_else(|| config.store_path());
        debug!("💾 Client storage: {}", store_path.display());

        Self {
            document: VirtualDocument::with_blog_chrome(),
            storage: Rc::new(JsonFileStorage::new(store_path)),
            preference: StaticPreference { prefers_dark: prefers_dark || config.prefers_dark },
        }
    }

    fn dump(&self) {
        if logger::is_verbose() {
            println!("<html {}>", self.document.root_element());
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let Cli { store, prefers_dark, command, .. } = cli;

    match command {
        Command::Ago { timestamp, now } => {
            let timestamp: Timestamp = timestamp.parse()?;
            let text = match now {
                Some(now) => format_relative_time_at(timestamp, now.parse()?),
                None => format_relative_time(timestamp),
            };
            println!("{}", text);
        }
        Command::Theme { action } => {
            let page = Page::open(store, prefers_dark);
            let toggle = ThemeToggle::bind(
                &page.document,
                page.storage.clone(),
                Rc::new(page.preference)
            )?;
            let theme = toggle.initialize();

            match action {
                ThemeAction::Show => println!("{}", theme),
                ThemeAction::Toggle => {
                    toggle.subscribe(|event| debug!("theme-switch: {}", event.theme));
                    println!("{}", toggle.toggle());
                }
            }
            page.dump();
        }
        Command::FontSize { action } => {
            let page = Page::open(store, prefers_dark);
            let switcher = FontSizeSwitcher::bind(&page.document, page.storage.clone())?;
            let restored = switcher.initialize();

            match action {
                FontSizeAction::Show => {
                    match restored {
                        Some(size) => println!("{}", size),
                        None => println!("{} (default)", madin::FontSize::default()),
                    }
                }
                FontSizeAction::Cycle => println!("{}", switcher.cycle()),
            }
            page.dump();
        }
        Command::Scroll { scroll_top, scroll_height, client_height } => {
            let metrics = ScrollMetrics::new(scroll_top, scroll_height, client_height);
            if !metrics.is_scrollable() {
                warn!("⚠️ Page is not scrollable; the percentage is meaningless");
            }
            println!("{}", scroll_percentage(metrics));
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}
