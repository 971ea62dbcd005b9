use std::io;
use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use defectline_service::BlockingClient;
use ratatui::prelude::*;

use defectline_tui::app::App;

const DEFAULT_PORT: u16 = 3620;
const DEFAULT_URL: &str = "http://127.0.0.1:3620";

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    // Parse CLI: defectline [--store URL]
    // --store URL (or DEFECTLINE_STORE_URL) → connect to an existing
    // remote store; otherwise spawn the simulated store locally.
    let (store_url, mut child) = if let Some(pos) = args.iter().position(|a| a == "--store") {
        let url = args
            .get(pos + 1)
            .context("--store requires a URL argument")?;
        (url.clone(), None)
    } else if let Ok(url) = std::env::var("DEFECTLINE_STORE_URL") {
        (url, None)
    } else {
        let child = spawn_store()?;
        (DEFAULT_URL.to_string(), Some(child))
    };

    let client = BlockingClient::new(&store_url);
    wait_for_store(&client)?;

    let result = run_tui(client);

    // Cleanup: kill the store if we spawned it
    if let Some(ref mut child) = child {
        let _ = child.kill();
        let _ = child.wait();
    }

    result
}

fn spawn_store() -> Result<Child> {
    // Look for defectline-simstore next to our own binary first, then
    // fall back to PATH
    let self_exe = std::env::current_exe().unwrap_or_default();
    let sibling = self_exe.parent().map(|d| d.join("defectline-simstore"));

    let store_bin = if sibling.as_ref().is_some_and(|p| p.exists()) {
        sibling.unwrap()
    } else {
        "defectline-simstore".into()
    };

    let child = Command::new(&store_bin)
        .env("DEFECTLINE_BIND", "127.0.0.1")
        .env("DEFECTLINE_PORT", DEFAULT_PORT.to_string())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to start {}", store_bin.display()))?;

    Ok(child)
}

fn wait_for_store(client: &BlockingClient) -> Result<()> {
    let start = Instant::now();
    let timeout = Duration::from_secs(10);

    loop {
        if client.health_check().is_ok() {
            return Ok(());
        }
        if start.elapsed() > timeout {
            bail!(
                "store at {} did not become ready within {}s",
                client.base_url(),
                timeout.as_secs()
            );
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn run_tui(client: BlockingClient) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, client);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    client: BlockingClient,
) -> Result<()> {
    let mut app = App::new(client);

    loop {
        terminal.draw(|frame| app.render(frame))?;

        // Poll with a timeout while a submission or banner is pending so
        // progress keeps rendering; block on input otherwise.
        if app.needs_polling() {
            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        break;
                    }
                    if key.code == KeyCode::Char('q') && !app.is_input_mode() {
                        break;
                    }
                    app.handle_key(key);
                }
            } else {
                app.on_tick();
            }
        } else if let Event::Key(key) = event::read()? {
            // Ctrl+C always quits
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            // q quits unless a text field has focus
            if key.code == KeyCode::Char('q') && !app.is_input_mode() {
                break;
            }
            app.handle_key(key);
        }
    }

    Ok(())
}
