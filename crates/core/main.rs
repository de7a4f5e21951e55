#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![allow(clippy::as_conversions, clippy::mod_module_files)]

use std::{path::PathBuf, process};

mod app;
mod commands;
mod file;
mod interact;

use app::Session;
use commands::Commands;

use bookfill::sheet::{column_index, ColumnLayout};
use clap::{Args, Parser};
use eyre::{Result, WrapErr};
use log::trace;

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        process::exit(2);
    }
}

fn try_main() -> Result<()> {
    let Cli {
        command,
        global_opts:
            GlobalOpts {
                file,
                interact,
                verbosity,
                quiet,
            },
        layout_opts,
    } = Cli::parse();

    setup_errlog(verbosity as usize, quiet)?;

    // `quiet` wins over `interact`
    let interact = interact && !quiet;
    if interact {
        trace!("Interact mode enabled");
    }

    let session = Session {
        file,
        interact,
        layout: layout_opts.into_layout()?,
    };

    let message = command.execute(&session)?;
    if !quiet {
        println!("{message}");
    }
    Ok(())
}

fn setup_errlog(verbosity: usize, quiet: bool) -> Result<()> {
    // if quiet then ignore verbosity but still show warnings and errors
    let verbosity = if quiet { 1 } else { verbosity + 2 };

    stderrlog::new().verbosity(verbosity).init()?;
    Ok(())
}

#[derive(Parser)]
#[clap(name = "bookfill")]
#[clap(about = "Fill a spreadsheet of ISBNs with book metadata and export it as a product catalog")]
#[clap(version, author)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(flatten)]
    global_opts: GlobalOpts,

    #[clap(flatten)]
    layout_opts: LayoutOpts,
}

#[derive(Debug, Args)]
struct GlobalOpts {
    /// The spreadsheet to read
    ///
    /// When omitted the current directory is searched and must contain exactly one spreadsheet
    /// (xlsx, xlsm, xlsb, xls or ods). A previous `book_data.xlsx` export is never picked.
    #[clap(short, long, parse(from_os_str), global = true)]
    file: Option<PathBuf>,

    /// Asks before overwriting an existing export.
    #[clap(short, long, global = true)]
    interact: bool,

    /// How chatty the program is when performing commands
    ///
    /// The number of times this flag is used will increase how chatty
    /// the program is.
    #[clap(short, long, parse(from_occurrences), global = true)]
    verbosity: u8,

    /// Prevents the program from writing to stdout, warnings and errors will still be printed to
    /// stderr.
    #[clap(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Args)]
struct LayoutOpts {
    /// Column holding the ISBN
    #[clap(long, default_value = "A", global = true)]
    isbn_column: String,

    /// Column holding the selling price
    #[clap(long, default_value = "B", global = true)]
    price_column: String,

    /// Column holding the purchase price
    #[clap(long, default_value = "C", global = true)]
    cost_column: String,

    /// Column holding the quantity in stock
    #[clap(long, default_value = "D", global = true)]
    quantity_column: String,

    /// Rounds selling prices to the nearest multiple of ten
    #[clap(long, global = true)]
    round_price: bool,
}

impl LayoutOpts {
    fn into_layout(self) -> Result<ColumnLayout> {
        let column = |letters: &str, name: &str| {
            column_index(letters).wrap_err_with(|| format!("Invalid --{name}-column"))
        };

        Ok(ColumnLayout {
            identifier: column(&self.isbn_column, "isbn")?,
            selling_price: column(&self.price_column, "price")?,
            purchase_price: column(&self.cost_column, "cost")?,
            quantity: column(&self.quantity_column, "quantity")?,
            round_selling_price: self.round_price,
        })
    }
}
