use serde_json::json;
use sift::{ResourcesConfig, SiftError};
use std::env;
use std::fs;

fn main() -> Result<(), SiftError> {
    if env::var("RUST_LOG").is_err() {
        unsafe { env::set_var("RUST_LOG", "sift=info"); }
    }
    env_logger::init();

    println!("Running resource filtering example...");

    // Usage: filter_resources [config.json]
    let workspace = tempfile::tempdir()?;
    let config = match env::args().nth(1) {
        Some(path) => {
            println!("✓ Using configuration: {}", path);
            ResourcesConfig::from_file(path)?
        }
        None => {
            let source = workspace.path().join("resources");
            fs::create_dir_all(source.join("META-INF"))?;
            fs::write(
                source.join("application.properties"),
                "app.name=${app.name}\napp.version=${project.version}\n",
            )?;
            fs::write(
                source.join("META-INF/build-info.txt"),
                "Built from ${scm.branch} by ${user.name}\n",
            )?;
            fs::write(source.join("notes.bak"), "not copied\n")?;
            println!("✓ Sample resources written to {}", source.display());

            let config = json!({
                "sourceDirectory": source,
                "targetDirectory": workspace.path().join("classes"),
                "excludes": ["**/*.bak"],
                "properties": {
                    "project.version": "0.1.0",
                    "app": { "name": "filter-demo" },
                    "scm": { "branch": "main" },
                    "user.name": "ci"
                }
            });
            ResourcesConfig::from_json_str(&config.to_string())?
        }
    };

    let summary = config.run()?;
    println!("\nSuccess! {}", summary);

    if env::args().nth(1).is_none() {
        for name in ["application.properties", "META-INF/build-info.txt"] {
            let path = config.target_directory.join(name);
            println!("\n--- {} ---\n{}", name, fs::read_to_string(path)?);
        }
    }
    Ok(())
}
