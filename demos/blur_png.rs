// Image loading/saving is outside scope of this library, lodepng does it here
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = std::env::args_os().skip(1);
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        eprintln!("usage: blur_png <input.png> <output.png> [radius]");
        return ExitCode::FAILURE;
    };
    let radius: u8 = match args.next().map(|r| r.to_string_lossy().parse()) {
        None => 5,
        Some(Ok(r)) => r,
        Some(Err(err)) => {
            eprintln!("radius: {err}");
            return ExitCode::FAILURE;
        },
    };

    let bitmap = match lodepng::decode24_file(&input) {
        Ok(b) => b,
        Err(err) => {
            eprintln!("Failed to load image from {}: {err}", input.to_string_lossy());
            return ExitCode::FAILURE;
        },
    };
    println!("Dimensions: {}x{}", bitmap.width, bitmap.height);

    // Configure the library
    let mut attr = binoblur::new();
    attr.set_log_callback(|_, msg| eprintln!("{msg}"));

    // Describe the bitmap
    let mut img = match attr.new_image_rgb(&bitmap.buffer, bitmap.width, bitmap.height) {
        Ok(img) => img,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        },
    };

    let start = std::time::Instant::now();
    if let Err(err) = attr.blur(&mut img, radius) {
        eprintln!("Blurring failed, because: {err}");
        return ExitCode::FAILURE;
    }
    println!("Blurring took {:.5}s", start.elapsed().as_secs_f64());

    if let Err(err) = lodepng::encode24_file(&output, &img.to_rgb(), img.width(), img.height()) {
        eprintln!("Failed to save {}: {err}", output.to_string_lossy());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
