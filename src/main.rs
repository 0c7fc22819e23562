use std::env;

use log::error;
use tokio_util::sync::CancellationToken;

use pantry_pilot::{ImageSource, ProcessorBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err("Usage: pantry-pilot <image> [<image>...]".into());
    }

    let images: Vec<ImageSource> = args[1..]
        .iter()
        .map(|path| ImageSource::Path(path.clone()))
        .collect();

    let processor = ProcessorBuilder::new().build()?;
    let result = processor
        .process_images(
            &images,
            |pct| eprint!("\rprocessing... {:3}%", pct),
            &CancellationToken::new(),
        )
        .await;
    eprintln!();

    if let Some(message) = result.error {
        error!("{}", message);
        return Err(message.into());
    }

    println!("Pantry items:");
    for item in &result.pantry_items {
        println!("  - {}", item);
    }

    for recipe in &result.recipes {
        println!("\n{}", recipe.title);
        println!("  Ingredients:");
        for ingredient in &recipe.ingredients {
            println!("    - {}", ingredient);
        }
        println!("  Steps:");
        for (number, step) in recipe.steps.iter().enumerate() {
            println!("    {}. {}", number + 1, step);
        }
    }

    Ok(())
}
