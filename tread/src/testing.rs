use log::{Level, Log, Metadata, Record};
use std::{cell::RefCell, sync::Once};

use crate::{Mesh, Rect, RenderTarget, Text};

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }
    fn log(&self, record: &Record) {
        RECORDS.with(|records| {
            records
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }
    fn flush(&self) {}
}

static INSTALL: Once = Once::new();

/// Runs `f` and returns what it logged on this thread.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<(Level, String)>) {
    INSTALL.call_once(|| {
        log::set_logger(&CaptureLogger).expect("another logger is installed");
        log::set_max_level(log::LevelFilter::Trace);
    });
    RECORDS.with(|records| records.borrow_mut().clear());
    let result = f();
    let records = RECORDS.with(|records| records.take());
    (result, records)
}

/// Records draw calls. Text is measured as half a character size per char,
/// one character size tall, starting a quarter size below the baseline origin.
#[derive(Default)]
pub struct RecordingTarget {
    pub meshes: Vec<Mesh>,
    pub texts: Vec<Text>,
    pub order: Vec<&'static str>,
}

impl RenderTarget for RecordingTarget {
    fn draw_mesh(&mut self, mesh: &Mesh) {
        self.meshes.push(mesh.clone());
        self.order.push("mesh");
    }
    fn draw_text(&mut self, text: &Text) {
        self.texts.push(text.clone());
        self.order.push("text");
    }
    fn text_bounds(&mut self, text: &Text) -> Rect {
        let size = text.character_size as f32;
        let chars = text.string.chars().count() as f32;
        Rect::new(0., size / 4., chars * size / 2., size)
    }
}
