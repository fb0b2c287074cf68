use clap::{Arg, ArgAction, Command as ClapCommand};
use log::{error, info, LevelFilter};
use std::process;

use tiffkit::extractor::{AnyExporter, Exporter};
use tiffkit::tiff::{load_file, LoadOptions};
use tiffkit::TiffResult;

fn main() {
    let matches = ClapCommand::new("tiffkit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Decode TIFF images and report their geometry")
        .arg(
            Arg::new("input")
                .help("Input TIFF file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("ifd")
                .long("ifd")
                .help("Decode only the directory with this index")
                .value_name("INDEX")
                .value_parser(clap::value_parser!(usize))
                .required(false),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let mut builder = env_logger::Builder::from_default_env();
    if matches.get_flag("verbose") {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    let input = matches.get_one::<String>("input").cloned().unwrap_or_default();
    let options = LoadOptions { ifd_index: matches.get_one::<usize>("ifd").copied() };

    if let Err(e) = run(&input, &options) {
        error!("Decoding {} failed: {}", input, e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(input: &str, options: &LoadOptions) -> TiffResult<()> {
    let exporter = AnyExporter::new();
    load_file(
        input,
        |header, ifd, data| {
            let image = exporter.export(header, ifd, &data)?;
            info!(
                "IFD #{}: {}x{}, {} channel(s), {} bits per channel, {} bytes",
                ifd.number,
                image.width,
                image.height,
                image.channels,
                image.bit_depth,
                image.data_size()
            );
            println!(
                "IFD #{}: {}x{} x{} @ {} bits",
                ifd.number, image.width, image.height, image.channels, image.bit_depth
            );
            Ok(())
        },
        options,
    )
}
