//! Demonstration CLI exercising each pipeline stage against real images and
//! synthetic buffers.

use clap::{Parser, Subcommand};
use jab_raster::Bitmap;
use jab_transform::{Point, Vector2D};
use log::info;
use std::error;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug)]
enum CliError {
    Core(jab_core::Error),
    Image(image::ImageError),
    BadArgument(String),
}

impl error::Error for CliError {}
impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Core(e) => write!(f, "{}", e),
            Self::Image(e) => write!(f, "failed to decode image: {}", e),
            Self::BadArgument(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<jab_core::Error> for CliError {
    fn from(e: jab_core::Error) -> Self {
        CliError::Core(e)
    }
}

impl From<image::ImageError> for CliError {
    fn from(e: image::ImageError) -> Self {
        CliError::Image(e)
    }
}

/// Tools for the JABCode image-to-matrix pipeline: perspective transforms,
/// grid sampling, masking, and interleaving.
#[derive(Debug, Parser)]
#[command(name = "jabcode", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build and print a perspective transform from a detected quad to a
    /// canonical module grid.
    Transform {
        /// Eight floats: x0 y0 x1 y1 x2 y2 x3 y3, clockwise from top-left.
        #[arg(num_args = 8)]
        corners: Vec<f32>,
        /// Module grid side size, width then height.
        #[arg(long, num_args = 2, default_values_t = [21, 21])]
        side: Vec<i32>,
    },
    /// Sample the full canonical module grid from a PNG image.
    Sample {
        image: PathBuf,
        #[arg(num_args = 8)]
        corners: Vec<f32>,
        #[arg(long, num_args = 2, default_values_t = [21, 21])]
        side: Vec<i32>,
    },
    /// Sample the cross-area strip between a host and docked slave symbol.
    CrossSample {
        image: PathBuf,
        #[arg(num_args = 8)]
        corners: Vec<f32>,
    },
    /// Select and apply the best mask over a solid test matrix of the given
    /// size and palette, printing the chosen mask id.
    Mask {
        #[arg(long, default_value_t = 21)]
        width: i32,
        #[arg(long, default_value_t = 21)]
        height: i32,
        #[arg(long, default_value_t = 4)]
        color_number: i32,
    },
    /// Demask a comma-separated byte stream using a known mask id.
    Demask {
        /// Comma-separated palette indices, e.g. "0,1,2,3".
        data: String,
        #[arg(long)]
        width: i32,
        #[arg(long)]
        height: i32,
        #[arg(long)]
        mask_id: u8,
        #[arg(long)]
        color_number: i32,
    },
    /// Interleave or deinterleave a comma-separated byte stream.
    Interleave {
        data: String,
        #[arg(long)]
        inverse: bool,
    },
}

fn parse_corners(corners: &[f32]) -> Result<(Point, Point, Point, Point), CliError> {
    if corners.len() != 8 {
        return Err(CliError::BadArgument("expected 8 corner values".into()));
    }
    Ok((
        Point::new(corners[0], corners[1]),
        Point::new(corners[2], corners[3]),
        Point::new(corners[4], corners[5]),
        Point::new(corners[6], corners[7]),
    ))
}

fn load_bitmap(path: &PathBuf) -> Result<Bitmap, CliError> {
    let img = image::open(path)?.to_rgba8();
    let (width, height) = img.dimensions();
    Ok(Bitmap::new(width as i32, height as i32, 4, img.into_raw()))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Transform { corners, side } => {
            let (p0, p1, p2, p3) = parse_corners(&corners)?;
            let side = Vector2D::new(side[0], side[1]);
            let t = jab_core::build_transform(p0, p1, p2, p3, side)?;
            info!("built transform for a {}x{} grid", side.x, side.y);
            println!("{:#?}", t);
        }
        Command::Sample { image, corners, side } => {
            let (p0, p1, p2, p3) = parse_corners(&corners)?;
            let side = Vector2D::new(side[0], side[1]);
            let bitmap = load_bitmap(&image)?;
            let t = jab_core::build_transform(p0, p1, p2, p3, side)?;
            let matrix = jab_core::sample_symbol(&bitmap, &t, side)?;
            let info = jab_core::DecodedSymbolInfo {
                side_size: side,
                mask_id: 0,
                color_number: 0,
            };
            println!("sampled {}x{} modules ({:?})", matrix.width, matrix.height, info);
        }
        Command::CrossSample { image, corners } => {
            let (p0, p1, p2, p3) = parse_corners(&corners)?;
            let bitmap = load_bitmap(&image)?;
            let side = Vector2D::new(jab_raster::SAMPLE_AREA_WIDTH, jab_raster::SAMPLE_AREA_HEIGHT);
            let t = jab_core::build_transform(p0, p1, p2, p3, side)?;
            let matrix = jab_core::sample_cross_area(&bitmap, &t)?;
            println!("sampled cross-area {}x{} modules", matrix.width, matrix.height);
        }
        Command::Mask { width, height, color_number } => {
            let mut matrix = jab_mask::IndexMatrix::new(width, height, vec![0i32; (width * height) as usize]);
            let chosen = jab_core::select_and_apply_mask(&mut matrix, color_number);
            println!("chosen mask id: {}", chosen);
        }
        Command::Demask {
            data,
            width,
            height,
            mask_id,
            color_number,
        } => {
            let mut bytes = parse_byte_list(&data)?;
            let data_map = vec![false; (width * height) as usize];
            let side = Vector2D::new(width, height);
            jab_core::demask(&mut bytes, &data_map, side, mask_id, color_number)?;
            println!("{}", format_byte_list(&bytes));
        }
        Command::Interleave { data, inverse } => {
            let mut bytes = parse_byte_list(&data)?;
            if inverse {
                jab_core::deinterleave(&mut bytes);
            } else {
                jab_core::interleave(&mut bytes);
            }
            println!("{}", format_byte_list(&bytes));
        }
    }
    Ok(())
}

fn parse_byte_list(data: &str) -> Result<Vec<u8>, CliError> {
    data.split(',')
        .map(|s| s.trim().parse::<u8>().map_err(|_| CliError::BadArgument(format!("not a byte: {}", s))))
        .collect()
}

fn format_byte_list(bytes: &[u8]) -> String {
    bytes.iter().map(|b| b.to_string()).collect::<Vec<_>>().join(",")
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
