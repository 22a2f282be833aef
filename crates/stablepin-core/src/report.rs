use crate::{ChangeRecord, ReportSink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeReport {
    NothingToDo,
    Single(String),
    Itemized { title: String, lines: Vec<String> },
}

impl ChangeReport {
    pub fn deliver(&self, sink: &mut dyn ReportSink) {
        match self {
            Self::NothingToDo => sink.status_line("nothing to reconcile"),
            Self::Single(line) => sink.status_line(line),
            Self::Itemized { title, lines } => sink.titled_report(title, lines),
        }
    }
}

pub fn build_change_report(changes: &[ChangeRecord]) -> ChangeReport {
    match changes {
        [] => ChangeReport::NothingToDo,
        [only] => ChangeReport::Single(format!("replaced {}", only.summary())),
        many => ChangeReport::Itemized {
            title: format!("replaced {} packages", many.len()),
            lines: many.iter().map(ChangeRecord::summary).collect(),
        },
    }
}
