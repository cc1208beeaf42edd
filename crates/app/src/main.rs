mod args;
mod console_host;
mod practice_vm;

use std::rc::Rc;

use chrono::{DateTime, Utc};
use clap::Parser;
use content::{Catalog, InMemoryScenarios, ScenarioRepository, builtin_catalog};
use mathplay_core::Clock;
use mathplay_core::model::ExerciseId;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::args::{Args, init_logging};
use crate::console_host::ConsoleHost;
use crate::practice_vm::{PracticeIntent, PracticeVm};

const HELP: &str = "Escribe tu respuesta y pulsa Enter. :next pasa al siguiente problema, :quit sale.";

fn load_repository(args: &Args) -> Result<InMemoryScenarios, Box<dyn std::error::Error>> {
    let catalog = match &args.catalog {
        Some(path) => {
            info!(path = %path.display(), "loading catalog");
            Catalog::load(path)?
        }
        None => builtin_catalog()?,
    };
    Ok(InMemoryScenarios::from_catalog(catalog)?)
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

/// Sleeps until `deadline`; never completes without one.
async fn sleep_until(clock: Clock, deadline: Option<DateTime<Utc>>) {
    match deadline {
        Some(deadline) => tokio::time::sleep(clock.wait_until(deadline)).await,
        None => std::future::pending::<()>().await,
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let repository = load_repository(&args)?;
    let exercises = repository.list_exercises();

    if args.list {
        for summary in &exercises {
            println!(
                "{:<28} {} ({} problemas)",
                summary.id.as_str(),
                summary.title,
                summary.scenario_count
            );
        }
        return Ok(());
    }

    let id = match &args.exercise {
        Some(id) => ExerciseId::new(id.as_str()),
        None => exercises
            .first()
            .map(|summary| summary.id.clone())
            .ok_or("the catalog has no exercises")?,
    };
    let definition = repository.get_exercise(&id)?;
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let clock = Clock::system();
    let host = Rc::new(ConsoleHost::new());
    let mut vm = PracticeVm::open(&definition, host, rng, clock);
    println!("{HELP}");
    print_lines(&vm.render());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match PracticeIntent::parse(&line) {
                    PracticeIntent::Quit => break,
                    PracticeIntent::Nothing => {}
                    PracticeIntent::Help => println!("{HELP}"),
                    PracticeIntent::Next => {
                        vm.next();
                        print_lines(&vm.render());
                    }
                    PracticeIntent::Answer(answer) => match vm.answer(&answer) {
                        Ok(outcome) => {
                            debug!(?outcome, "answer handled");
                            println!("{}", vm.status_line());
                        }
                        Err(err) => {
                            debug!(%err, "answer ignored");
                            println!("({err})");
                        }
                    },
                }
            }
            () = sleep_until(clock, vm.next_deadline()) => {
                if vm.tick(clock.now()) {
                    println!("Puedes intentarlo de nuevo.");
                }
            }
        }
    }

    println!("{}", vm.status_line());
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    if let Err(err) = run(args).await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
