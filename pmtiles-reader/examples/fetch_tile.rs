//! Fetch one tile from a remote archive and print what was found.
//!
//! Usage: fetch_tile <url> [z x y]

use pmtiles_reader::Reader;
use pmtiles_store::HttpStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let url = args.next().ok_or("usage: fetch_tile <url> [z x y]")?;
    let z: u8 = args.next().as_deref().unwrap_or("0").parse()?;
    let x: u32 = args.next().as_deref().unwrap_or("0").parse()?;
    let y: u32 = args.next().as_deref().unwrap_or("0").parse()?;

    let reader = Reader::open(HttpStore::new(&url)?).await?;

    let (min_lon, min_lat, max_lon, max_lat) = reader.bounds();
    println!("tile type:   {:?}", reader.tile_type());
    println!("compression: {:?}", reader.tile_compression());
    println!("zoom:        {}..{}", reader.min_zoom(), reader.max_zoom());
    println!("bounds:      ({min_lon}, {min_lat}) .. ({max_lon}, {max_lat})");

    match reader.get_tile(z, x, y).await? {
        Some(tile) => println!("tile {z}/{x}/{y}: {} bytes", tile.len()),
        None => println!("tile {z}/{x}/{y}: not found"),
    }

    Ok(())
}
