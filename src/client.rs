use log::info;
use std::error::Error;
use std::sync::Arc;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, BufReader };

use crate::cli::Args;
use crate::controller::{ ControllerMode, FormController, FormState, SubmitOutcome };
use crate::models::plan::DateRange;
use crate::render::{ format_date_range, render_chat_entry, render_plan, ViewMode };
use crate::storage::PlanStore;
use crate::transport::schema::{ DestinationSchema, PlanSchema, QuerySchema };
use crate::transport::{ HttpTransport, TransportConfig };

/// Runs the terminal front-end: a single form submission with `--query`, or
/// a chat session reading one request per line from stdin.
pub async fn run(args: &Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let (mode, schema): (ControllerMode, Arc<dyn PlanSchema>) = if args.chat {
        (ControllerMode::Chat, Arc::new(QuerySchema))
    } else {
        (ControllerMode::Form, Arc::new(DestinationSchema))
    };

    let config = TransportConfig::new(args.direct_backend_url.clone(), args.origin.clone());
    let transport = HttpTransport::new(&config, schema)?;
    let controller = FormController::new(Arc::new(transport), mode);
    let store = PlanStore::new(&args.saved_plan_path);

    if args.load_plan {
        if controller.load_saved_plan(&store)? {
            info!("Restored saved plan from {}", store.path().display());
            print_plan(&controller.snapshot(), ViewMode::Timeline);
        } else {
            println!("No saved plan in {}", store.path().display());
        }
    }

    let date_range = DateRange::new(args.start_date, args.end_date);
    println!("📅 {}", format_date_range(date_range.start, date_range.end));

    match mode {
        ControllerMode::Form => {
            let query = args.query.as_deref().unwrap_or_default();
            let outcome = controller.submit(query, Some(date_range)).await;
            report(&controller, &outcome, args.view, 0);
        }
        ControllerMode::Chat => {
            println!("Ask for a trip (empty line to skip, Ctrl-D to quit).");
            chat_session(&controller, BufReader::new(tokio::io::stdin()), date_range, args.view).await?;
        }
    }

    if args.save_plan {
        controller.save_plan(&store)?;
        println!("Plan saved to {}", store.path().display());
    }

    Ok(())
}

/// Submits one request per input line until EOF. Blank lines are skipped
/// without touching the controller. Returns how many lines were submitted.
async fn chat_session<R: AsyncBufRead + Unpin>(
    controller: &FormController,
    reader: R,
    date_range: DateRange,
    view: ViewMode
) -> std::io::Result<usize> {
    let mut lines = reader.lines();
    let mut submitted = 0;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let seen = controller.snapshot().history.len();
        let outcome = controller.submit(&line, Some(date_range)).await;
        report(controller, &outcome, view, seen);
        submitted += 1;
    }
    Ok(submitted)
}

fn report(controller: &FormController, outcome: &SubmitOutcome, view: ViewMode, seen: usize) {
    let state = controller.snapshot();
    match outcome {
        SubmitOutcome::Applied => match controller.mode() {
            ControllerMode::Form => print_plan(&state, view),
            ControllerMode::Chat => {
                for entry in state.history.iter().skip(seen) {
                    print!("{}", render_chat_entry(entry));
                }
                if let Some(plan) = &state.plan {
                    if !plan.ideas.is_empty() || !plan.timeline.is_empty() {
                        print!("{}", render_plan(plan, view));
                    }
                }
            }
        },
        SubmitOutcome::Failed(_) | SubmitOutcome::Invalid => {
            if let Some(error) = &state.error {
                eprintln!("🚨 {}", error);
            }
        }
        SubmitOutcome::Busy => eprintln!("⏳ Still planning, try again shortly."),
        SubmitOutcome::Stale => {}
    }
}

fn print_plan(state: &FormState, view: ViewMode) {
    if let Some(plan) = &state.plan {
        print!("{}", render_plan(plan, view));
    }
}
