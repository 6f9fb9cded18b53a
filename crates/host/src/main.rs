mod agents;
mod log;

use std::io::{self, BufRead, Write};

use anyhow::Result;

use toolcall_eval_core::config::Config;
use toolcall_eval_core::openai_client::OpenAiClient;
use toolcall_eval_core::trace_store;

use agents::{Assistant, Judge};

fn main() -> Result<()> {
    log::init();

    // Initialize services
    let config = Config::from_env()?;
    let client = OpenAiClient::from_config(&config)?;
    let store = trace_store::from_config(&config)?;

    println!("\nTool-calling assistant");
    println!("Ask a question and press Enter.");
    println!("Commands: ':eval' judges recorded spans, ':spans' lists them, 'quit' exits.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();

        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            println!("Goodbye!");
            break;
        }

        match line {
            ":spans" => match store.fetch_spans(&config.project) {
                Ok(spans) => {
                    println!("\n{} span(s) in project '{}':", spans.len(), config.project);
                    for span in &spans {
                        println!(
                            "  - {} [{:?}] {} -> {}",
                            span.span_id(),
                            span.status_code,
                            log::truncate(span.input().unwrap_or("-"), 60),
                            log::truncate(span.output().unwrap_or("-"), 60),
                        );
                    }
                    println!();
                }
                Err(e) => println!("\n[ERROR] {e:#}\n"),
            },
            ":eval" => {
                let judge = Judge::new(&client, &config.eval_name);
                match judge.evaluate_project(store.as_ref(), &config.project) {
                    Ok(report) => {
                        println!("\nEvaluations:");
                        for eval in &report.evaluations {
                            println!(
                                "  - {} {} (score = {}) {}",
                                eval.span_id,
                                eval.label,
                                eval.score,
                                log::truncate(&eval.explanation, 80)
                            );
                        }
                        for failure in &report.failures {
                            println!("  - {} FAILED: {}", failure.span_id, failure.error);
                        }
                        println!(
                            "\n{} valid / {} judged, {} failed, {} skipped\n",
                            report.valid_count(),
                            report.evaluations.len(),
                            report.failures.len(),
                            report.skipped
                        );
                    }
                    Err(e) => println!("\n[ERROR] {e:#}\n"),
                }
            }
            query => {
                let assistant = Assistant::new(&client, store.as_ref());
                match assistant.run(query) {
                    Ok(turn) => println!("\n{}\n", turn.output),
                    Err(e) => println!("\n[ERROR] {e:#}\n"),
                }
            }
        }
    }

    Ok(())
}
