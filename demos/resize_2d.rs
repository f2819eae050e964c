//! Example driving the resize collaborator through image handles
//!
//! Loads a grayscale image, resizes it and writes the result:
//!
//! ```text
//! cargo run --example resize_2d -- input.png output.png [width height]
//! ```

use memref_container::{
    imread, imwrite, resize_2d, ChannelLayout, ImageHandle, InterpolationType, ReadMode, ResizeTarget,
};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: {} <input> <output> [width height]", args[0]);
        std::process::exit(2);
    }
    let (width, height) = match (args.get(3), args.get(4)) {
        (Some(w), Some(h)) => (w.parse()?, h.parse()?),
        _ => (224, 224),
    };

    // Read as grayscale image.
    let input: ImageHandle<f32, 2> = imread(&args[1], ReadMode::Grayscale)?;
    log::info!(
        "Loaded {} as {}x{} ({} elements)",
        args[1],
        input.width(),
        input.height(),
        input.len()
    );

    let output = resize_2d(
        &input,
        InterpolationType::NearestNeighbour,
        ResizeTarget::Dimensions { width, height },
    )?;

    let output = ImageHandle::from_buffer(output, ChannelLayout::Nhwc);
    imwrite(&args[2], &output)?;
    log::info!("Wrote {}x{} image to {}", output.width(), output.height(), args[2]);

    Ok(())
}
