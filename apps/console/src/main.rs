mod commands;
mod render;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::normalize_base_url, load_settings, ClockReceiver, HttpTaskStore, MutationOrdering,
    TaskListController, TaskStore,
};
use shared::domain::Task;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tokio_stream::{wrappers::WatchStream, StreamExt};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::commands::{parse_command, Command, HELP};

#[derive(Parser, Debug)]
#[command(about = "Terminal front end for the task service")]
struct Args {
    /// Service base URL; overrides client.toml and the environment.
    #[arg(long)]
    server_url: Option<String>,
    /// Reconnect the clock stream with backoff after it drops.
    #[arg(long)]
    reconnect: bool,
    /// Run task mutations one at a time instead of concurrently.
    #[arg(long)]
    serialized: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.server_url.as_deref() {
        settings.base_url = normalize_base_url(url);
    }
    if args.reconnect {
        settings.enable_reconnect();
    }
    let ordering = if args.serialized {
        MutationOrdering::Serialized
    } else {
        MutationOrdering::Concurrent
    };
    info!(base_url = %settings.base_url, ?ordering, "console starting");

    let store = HttpTaskStore::from_settings(&settings).context("invalid service base URL")?;
    let controller = TaskListController::with_ordering(store, ordering);
    let clock_url = settings.clock_url().context("invalid clock URL")?;
    let clock = ClockReceiver::spawn(clock_url, settings.reconnect);

    run(&controller, &clock).await?;

    controller.teardown();
    clock.close().await;
    Ok(())
}

async fn run<S>(controller: &Arc<TaskListController<S>>, clock: &ClockReceiver) -> Result<()>
where
    S: TaskStore + 'static,
{
    let mut notices = controller.subscribe_notices();
    let mut views = WatchStream::new(controller.subscribe());
    let mut statuses = WatchStream::new(clock.subscribe_status());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut printer = render::ViewPrinter::default();

    spawn_flow(controller, |c| async move { c.activate().await });
    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match parse_command(&line) {
                    None => {}
                    Some(Ok(Command::Quit)) => break,
                    Some(Ok(command)) => dispatch(controller, clock, command),
                    Some(Err(err)) => println!("{err}"),
                }
            }
            notice = notices.recv() => match notice {
                Ok(notice) => println!("{}", render::render_notice(&notice)),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "console: notices lagged"),
                Err(RecvError::Closed) => break,
            },
            Some(view) = views.next() => {
                if let Some(text) = printer.update(&view) {
                    print!("{text}");
                }
            }
            Some(status) = statuses.next() => println!("{}", render::render_status(status)),
        }
    }
    Ok(())
}

/// Runs one controller flow in the background. Failures already reach the
/// notice channel, so the result is only logged.
fn spawn_flow<S, F, Fut>(controller: &Arc<TaskListController<S>>, flow: F)
where
    S: TaskStore + 'static,
    F: FnOnce(Arc<TaskListController<S>>) -> Fut,
    Fut: std::future::Future<Output = Result<client_core::MutationOutcome, client_core::TransportError>>
        + Send
        + 'static,
{
    let fut = flow(Arc::clone(controller));
    tokio::spawn(async move {
        match fut.await {
            Ok(outcome) => debug!(?outcome, "console: flow finished"),
            Err(err) => debug!(error = %err, "console: flow failed"),
        }
    });
}

fn dispatch<S>(controller: &Arc<TaskListController<S>>, clock: &ClockReceiver, command: Command)
where
    S: TaskStore + 'static,
{
    match command {
        Command::List => {
            println!("{}", render::render_clock(clock.latest().as_deref()));
            print!("{}", render::render_view(&controller.view()));
        }
        Command::Time => println!("{}", render::render_clock(clock.latest().as_deref())),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
        Command::Add(title) => {
            spawn_flow(controller, |c| async move { c.submit(&title).await });
        }
        Command::Toggle(n) => with_task(controller, n, |c, task| async move {
            c.toggle(&task.id, task.completed).await
        }),
        Command::Done(n) => with_task(controller, n, |c, task| async move {
            c.set_completed(&task.id, true).await
        }),
        Command::Undo(n) => with_task(controller, n, |c, task| async move {
            c.set_completed(&task.id, false).await
        }),
        Command::Rename(n, title) => with_task(controller, n, |c, task| async move {
            c.rename(&task.id, &title).await
        }),
        Command::Remove(n) => with_task(controller, n, |c, task| async move {
            c.delete(&task.id).await
        }),
    }
}

/// Resolves a 1-based position against the displayed snapshot.
fn with_task<S, F, Fut>(controller: &Arc<TaskListController<S>>, n: usize, flow: F)
where
    S: TaskStore + 'static,
    F: FnOnce(Arc<TaskListController<S>>, Task) -> Fut,
    Fut: std::future::Future<Output = Result<client_core::MutationOutcome, client_core::TransportError>>
        + Send
        + 'static,
{
    let Some(task) = controller.tasks().into_iter().nth(n - 1) else {
        println!("no task {n}");
        return;
    };
    spawn_flow(controller, |c| flow(c, task));
}
