use std::path::PathBuf;

use crate::app::{self, ExportFormat, Session};

use bookfill::pipeline::Options;
use clap::Subcommand;
use log::trace;

#[derive(Subcommand)]
#[non_exhaustive]
pub enum Commands {
    /// Look up every ISBN in the spreadsheet and export the enriched catalog
    ///
    /// Rows are looked up one at a time in Google Books and, when that finds nothing, in Open
    /// Library. Rows that cannot be resolved are listed once the run completes and left out of the
    /// export.
    Enrich {
        /// Export as xlsx, json or both
        #[clap(long, default_value = "xlsx")]
        format: ExportFormat,

        /// Directory the exports are written to
        #[clap(short, long, parse(from_os_str), default_value = ".")]
        output_dir: PathBuf,

        /// Separator placed between the segments of the feature column
        #[clap(short, long, env = "BOOKFILL_SEPARATOR", default_value = ",")]
        separator: String,

        /// Google Books API key, requests are anonymous without one
        #[clap(long, env = "GOOGLE_BOOKS_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Read the spreadsheet and list the rows an `enrich` would process
    ///
    /// No lookups are made.
    Check,

    /// Look up a single ISBN without a spreadsheet
    #[clap(arg_required_else_help = true)]
    Lookup {
        /// The ISBN to search for
        isbn: String,

        /// Google Books API key, requests are anonymous without one
        #[clap(long, env = "GOOGLE_BOOKS_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

impl Commands {
    pub fn execute(self, session: &Session) -> eyre::Result<String> {
        match self {
            Self::Enrich {
                format,
                output_dir,
                separator,
                api_key,
            } => {
                let sheet = app::load_sheet(session.file.as_deref())?;
                let options = Options {
                    layout: session.layout.clone(),
                    api_key,
                    feature_separator: separator,
                    ..Options::default()
                };

                let client = bookfill::api::http_client()?;
                let ctx = app::enrich(client, options, &sheet)?;

                let written = app::export(&ctx, format, &output_dir, session.interact)?;
                trace!("{} export file(s) written", written.len());

                Ok(app::summary(&ctx, &written))
            }
            Self::Check => {
                let sheet = app::load_sheet(session.file.as_deref())?;
                Ok(app::describe(&sheet, &session.layout))
            }
            Self::Lookup { isbn, api_key } => app::lookup(&isbn, api_key.as_deref()),
        }
    }
}
