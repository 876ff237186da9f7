//! # img-squeeze CLI
//!
//! Command-line interface for the image optimizer.
//!
//! ## Usage
//! ```bash
//! img-squeeze optimize ~/Desktop/shoot --out-dir ~/Desktop/web
//! img-squeeze optimize a.jpg b.png --preset modern-format --output json
//! img-squeeze estimate --count 25 --format avif
//! ```

mod cli;

use image_squeeze::Result;

fn main() -> Result<()> {
    image_squeeze::init_tracing();
    cli::run()
}
