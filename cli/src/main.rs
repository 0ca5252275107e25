//! Binary entrypoint for fontsearch (made by FontLab https://www.fontlab.com/)

fn main() {
    if let Err(err) = fontsearch_cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
