//! Paste session example - builds a selection from in-memory "clipboard" images

use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use imagify::{ClipboardItem, ExportConfig, IntakeConfig, Session};

fn pasted(width: u32, height: u32, color: [u8; 3]) -> Vec<ClipboardItem> {
    let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb(color)));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("encode pasted image");
    vec![
        ClipboardItem {
            media_type: "text/html".to_string(),
            bytes: b"<img>".to_vec(),
        },
        ClipboardItem {
            media_type: "image/png".to_string(),
            bytes: out.into_inner(),
        },
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Imagify - Paste Session Example\n");

    let mut session = Session::new(ExportConfig::default(), IntakeConfig::default())?;
    session.paste(pasted(1200, 400, [220, 40, 40])).await;
    session.paste(pasted(200, 200, [40, 220, 40])).await;
    session.paste(pasted(300, 900, [40, 40, 220])).await;
    println!("{} image(s) pasted", session.selection().len());

    session.remove(1);
    session.set_output_name("pasted.pdf");

    if let Some(document) = session.export().await? {
        for (page, placement) in document.placements().iter().enumerate() {
            println!(
                "page {}: {:.1}x{:.1} at ({:.1}, {:.1}), scale {:.3}",
                page + 1,
                placement.rect.width,
                placement.rect.height,
                placement.rect.x,
                placement.rect.y,
                placement.scale
            );
        }
        let uri = document.to_data_uri();
        println!("\n{}...", &uri[..uri.len().min(80)]);
    }

    Ok(())
}
