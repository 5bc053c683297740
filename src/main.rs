use std::{fs, io};

use color_eyre::{eyre::WrapErr, Result};
use sshell::prelude::*;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[macro_use]
extern crate tracing;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    color_eyre::install()?;

    let config = Config::load()?;
    let _guard = init_tracing(&config)?;

    trace!(?config, "starting shell");

    let mut state = State::new(&config);
    let mut input = Input::stdin();

    loop {
        state.render()?;

        let line = match input.next_line()? {
            InputMessage::Line(line) => line,
            InputMessage::Eof => {
                trace!("end of input");
                state.drain_background();
                "exit".to_string()
            }
        };

        if !input.is_interactive() {
            state.echo(&line)?;
        }

        state.poll_background();

        if state.execute(&line)? == Flow::Exit {
            break;
        }
    }

    Ok(())
}

fn init_tracing(config: &Config) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .wrap_err_with(|| format!("failed to create log directory {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, "sshell.log"));
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };
    let stderr_layer = file_layer
        .is_none()
        .then(|| fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(filter)
        .with(tracing_error::ErrorLayer::default())
        .init();

    Ok(guard)
}
