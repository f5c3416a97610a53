//! Arcade Forge - command line front end
//!
//! Native only. The browser runtime starts from the library's
//! `#[wasm_bindgen(start)]` entry point inside the assembled document.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};

    use arcade_forge::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
    use arcade_forge::params::{Overrides, parse_override, resolve_for, validate};
    use arcade_forge::sim::{Action, Direction, InputModel, Phase, Session};
    use arcade_forge::templates::CATALOG;
    use arcade_forge::{
        Error, GameConfig, Result, RuntimeBundle, TemplateId, assemble, export_file_name,
        preview_page,
    };
    use clap::{Parser, Subcommand};
    use glam::Vec2;

    /// Steps per wall-clock second at the nominal frame rate
    const STEPS_PER_SECOND: u64 = 60;

    #[derive(Parser)]
    #[command(name = "arcade-forge")]
    #[command(about = "Build standalone reskinned arcade games")]
    pub struct Cli {
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Assemble a playable HTML document
        Export {
            /// Game configuration JSON
            #[arg(long)]
            config: PathBuf,
            /// wasm-bindgen `no-modules` output directory
            #[arg(long)]
            runtime: PathBuf,
            #[arg(long, default_value = ".")]
            out: PathBuf,
        },
        /// Assemble a document wrapped in a sandboxed preview page
        Preview {
            #[arg(long)]
            config: PathBuf,
            #[arg(long)]
            runtime: PathBuf,
            #[arg(long, default_value = ".")]
            out: PathBuf,
        },
        /// Run a kernel headlessly and report the outcome
        Simulate {
            #[arg(long)]
            template: String,
            #[arg(long, default_value_t = 600)]
            frames: u64,
            #[arg(long, default_value_t = 1)]
            seed: u64,
            /// Apply the template's primary action every N frames (0 = never)
            #[arg(long, default_value_t = 20)]
            action_every: u64,
            /// Parameter override, `name=number` (repeatable)
            #[arg(long = "set", value_name = "NAME=VALUE")]
            set: Vec<String>,
        },
        /// List templates and their parameters
        Templates,
    }

    pub fn run(cli: Cli) -> Result<()> {
        match cli.command {
            Commands::Export {
                config,
                runtime,
                out,
            } => {
                let (config, document) = build(&config, &runtime)?;
                let path = out.join(export_file_name(&config.template_id));
                write(&path, &document)?;
                println!("{}", path.display());
            }
            Commands::Preview {
                config,
                runtime,
                out,
            } => {
                let (config, document) = build(&config, &runtime)?;
                let name = export_file_name(&config.template_id).replace("-game.html", "-preview.html");
                let path = out.join(name);
                write(&path, &preview_page(&document))?;
                println!("{}", path.display());
            }
            Commands::Simulate {
                template,
                frames,
                seed,
                action_every,
                set,
            } => {
                let id = TemplateId::parse(&template).ok_or_else(|| Error::UnknownTemplate(template.clone()))?;
                let mut overrides = Overrides::new();
                for raw in &set {
                    parse_override(raw, &mut overrides)?;
                }
                let params = resolve_for(id.template(), &overrides);
                for warning in validate(id.template(), &params) {
                    println!("warning: {warning}");
                }
                let session = simulate(Session::new(id, params, seed), frames, action_every);
                println!(
                    "{id}: seed {seed}, {} steps, score {}, {}",
                    session.state.ticks,
                    session.score(),
                    match session.phase() {
                        Phase::Over => "game over",
                        _ => "still running",
                    }
                );
            }
            Commands::Templates => {
                for template in &CATALOG {
                    println!("{} - {}", template.id, template.name);
                    println!("    {}", template.description);
                    for spec in template.params {
                        println!(
                            "    {:<18} {:>8} [{}, {}]  {}",
                            spec.name, spec.default, spec.min, spec.max, spec.description
                        );
                    }
                }
            }
        }
        Ok(())
    }

    fn build(config: &Path, runtime: &Path) -> Result<(GameConfig, String)> {
        let config = GameConfig::load(config)?;
        let bundle = RuntimeBundle::from_dir(runtime)?;
        let document = assemble(&config, &bundle);
        Ok((config, document))
    }

    fn write(path: &Path, contents: &str) -> Result<()> {
        std::fs::write(path, contents).map_err(|e| Error::io(path, e))?;
        log::info!("Wrote {} ({} bytes)", path.display(), contents.len());
        Ok(())
    }

    /// Scripted stand-in for a player: the same action on a fixed cadence
    fn scripted_action(model: InputModel) -> Action {
        match model {
            InputModel::Tap => Action::Primary,
            InputModel::Point => Action::PointAt(Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0)),
            InputModel::Directional => Action::Move(Direction::Up),
        }
    }

    /// Run `session` for up to `frames` steps, feeding countdown seconds as
    /// nominal time passes
    pub(crate) fn simulate(mut session: Session, frames: u64, action_every: u64) -> Session {
        session.start();
        for frame in 1..=frames {
            if action_every > 0 && frame % action_every == 0 {
                session.handle_action(scripted_action(session.input_model()));
            }
            session.step();
            if frame % STEPS_PER_SECOND == 0 {
                session.clock_second();
            }
            if session.phase() == Phase::Over {
                break;
            }
        }
        session
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::init();
    match cli::run(cli::Cli::parse()) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser entry point is the library's start function
}
