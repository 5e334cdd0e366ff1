use std::env;

use cswl1_demosaic::{CfaPhase, Cswl1Demosaic, Cswl1Params, Termination};
use image::DynamicImage;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} [options] <input_image> <output_image>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("   -p <pattern>  CFA pattern: RGGB, GRBG, GBRG or BGGR (default RGGB)");
    eprintln!("   -E            Report the energy after each iteration");
    eprintln!("   -a <number>   alpha, chroma weight (default 1.8)");
    eprintln!("   -e <number>   epsilon, graph floor weight (default 0.15)");
    eprintln!("   -f <number>   sigma, graph smoothing (default 0.6)");
    eprintln!("   -t <number>   convergence tolerance (default 0.001)");
    eprintln!("   -m <number>   maximum number of iterations (default 250)");
    eprintln!();
    eprintln!("Example: {program} -p GRBG input.png output.png");
    std::process::exit(1);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("dmcswl1");

    let mut phase = CfaPhase::RGGB;
    let mut params = Cswl1Params::default();
    let mut files = Vec::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = || iter.next().ok_or_else(|| format!("Missing value for {arg}"));
        match arg.as_str() {
            "-p" => phase = value()?.parse()?,
            "-E" => params.report_energy = true,
            "-a" => params.alpha = value()?.parse().map_err(|_| "Invalid alpha")?,
            "-e" => params.epsilon = value()?.parse().map_err(|_| "Invalid epsilon")?,
            "-f" => params.sigma = value()?.parse().map_err(|_| "Invalid sigma")?,
            "-t" => params.tolerance = value()?.parse().map_err(|_| "Invalid tolerance")?,
            "-m" => params.max_iterations = value()?.parse().map_err(|_| "Invalid max iterations")?,
            "-h" | "--help" => usage(program),
            _ if arg.starts_with('-') => {
                eprintln!("Unknown option {arg}");
                usage(program);
            }
            _ => files.push(arg.clone()),
        }
    }

    let [input_path, output_path] = files.as_slice() else {
        usage(program);
    };

    // The input is a full-color image; it is mosaiced with the chosen pattern first
    let img = image::open(input_path)?;
    let mut rgb = img.to_rgb32f();
    println!(
        "Processing {}x{} image with {} pattern",
        rgb.width(),
        rgb.height(),
        phase
    );

    let report = rgb.cswl1_demosaic_with_report(phase, &params)?;

    if params.report_energy {
        println!(" Iter     Energy");
        for (i, energy) in report.energies.iter().enumerate() {
            println!("{:5} {:10.1}", i, energy);
        }
    }
    match report.termination {
        Termination::Converged => println!("Converged in {} iterations.", report.iterations),
        Termination::MaxIterReached => println!("Maximum number of iterations exceeded."),
    }
    println!("CPU Time: {:.3} s", report.elapsed.as_secs_f64());

    DynamicImage::ImageRgb32F(rgb).to_rgb8().save(output_path)?;
    println!("Output written to \"{}\".", output_path);

    Ok(())
}
