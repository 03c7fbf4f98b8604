use std::error::Error;

use qrforge::{ECLevel, QRBuilder};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let data = args.get(1).map(String::as_str).unwrap_or("Hello, world!");

    let qr = QRBuilder::new(data.as_bytes()).ec_level(ECLevel::M).build()?;
    println!("{}", qr.to_str(1));

    Ok(())
}
