//! Export every image in a folder - demonstrates intake and export

use imagify::{ExportConfig, IntakeConfig, IntakeOrder, RawInput, Session};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let folder = args.next().unwrap_or_else(|| ".".to_string());
    let name = args.next().unwrap_or_else(|| "folder.pdf".to_string());

    println!("Imagify - Export Folder Example\n");

    let mut paths: Vec<_> = std::fs::read_dir(&folder)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let intake = IntakeConfig {
        order: IntakeOrder::Input,
        ..Default::default()
    };
    let mut session = Session::new(ExportConfig::default(), intake)?;
    let added = session.add(paths.into_iter().map(RawInput::file).collect()).await;
    println!("Selected {} image(s) from {}", added, folder);

    session.set_output_name(name);
    match session.export().await? {
        Some(document) => {
            let path = document.save_in(&folder).await?;
            println!("Wrote {} page(s) to {}", document.page_count(), path.display());
        }
        None => println!("Nothing to export"),
    }

    Ok(())
}
