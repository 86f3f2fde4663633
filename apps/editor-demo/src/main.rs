mod console;
mod fs_contents;

use std::rc::Rc;

use anyhow::Context;
use console::{BufferEditorFactory, ConsoleShell};
use fs_contents::FsContentsManager;
use weft_core::send_message;
use weft_editor::{AppShell, ContentsModel, EditorPlugin, FileHandler};
use weft_runtime_std::StdRuntime;
use weft_widget::{document_body, ResizeMessage, WidgetMessage};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "Cargo.toml".to_string());
    let root = std::env::current_dir().context("reading the working directory")?;

    let runtime = StdRuntime::new();
    let shell = Rc::new(ConsoleShell::new()?);
    let factory = Rc::new(BufferEditorFactory);

    let plugin = EditorPlugin::new(shell.clone(), factory.clone());
    plugin.run();

    let handler = FileHandler::new(Rc::new(FsContentsManager::new(root)), factory);
    let editor = handler.open(&ContentsModel::new(path.clone(), ""));
    editor.widget().set_id("main");
    shell.add_to_main_area(editor.widget());

    shell.root().attach(&document_body())?;
    let frames = runtime.run_until_idle();
    log::info!("opened {} in {} frames", path, frames);

    send_message(shell.root(), &WidgetMessage::Resize(ResizeMessage::new(800, 600)));
    shell.root().update(false);
    runtime.run_until_idle();

    println!("=== weft editor demo ===");
    print!("{}", shell.root().dump());
    println!();
    println!("{}", document_body().dump());

    let text = editor.editor().value();
    println!("{} ({} lines)", editor.widget().title().text(), text.lines().count());
    for line in text.lines().take(10) {
        println!("  | {}", line);
    }

    editor.widget().close(true);
    shell.root().dispose();
    Ok(())
}
