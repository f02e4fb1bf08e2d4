use std::path::PathBuf;
use std::time::Instant;

use loopgen::config::Params;
use loopgen::render;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let seed: u64 = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(rand::random);
    let size: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(13);
    let out_dir: PathBuf = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("artifacts"));
    let scale: usize = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(16);

    if let Err(e) = std::fs::create_dir_all(&out_dir) {
        eprintln!("failed to create {}: {e}", out_dir.display());
        std::process::exit(1);
    }

    let params = Params::default();

    eprintln!(
        "Generating {}x{} loop with seed={}, padding={}, max_attempts={}",
        size, size, seed, params.padding, params.max_attempts
    );

    let t = Instant::now();
    let result = match loopgen::generate(seed, size, &params) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("generation failed: {e}");
            std::process::exit(1);
        }
    };
    eprintln!(
        "  path of {} cells, camp at {}, {:.2} ms",
        result.path.len(),
        result.loop_start,
        t.elapsed().as_secs_f64() * 1000.0
    );

    let px = (size * scale.max(1)) as u32;
    let save = |name: &str, rgba: &[u8]| {
        let path = out_dir.join(name);
        match image::save_buffer(&path, rgba, px, px, image::ColorType::Rgba8) {
            Ok(()) => eprintln!("Saved {}", path.display()),
            Err(e) => eprintln!("failed to save {}: {e}", path.display()),
        }
    };

    save("tiles.png", &render::render_tiles(&result.tiles, scale));
    save("path.png", &render::render_path(&result.tiles, &result.path, scale));

    let json_path = out_dir.join("loop.json");
    let written = serde_json::to_string(&result)
        .map_err(std::io::Error::from)
        .and_then(|json| std::fs::write(&json_path, json));
    match written {
        Ok(()) => eprintln!("Saved {}", json_path.display()),
        Err(e) => eprintln!("failed to save {}: {e}", json_path.display()),
    }

    eprintln!("\nDone.");
}
