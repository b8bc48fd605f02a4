//! Text rendering of the session for terminals.

use std::{collections::BTreeMap, io::Write};

use piine_core::ViewPort;
use shared::domain::{ElementRef, ParticipantId};
use tracing::debug;

/// Writes one line per view change; reaction counts are kept per label.
pub struct ConsoleView<W: Write + Send> {
    out: W,
    mounted: Option<ElementRef>,
    roster: BTreeMap<ParticipantId, u64>,
}

impl<W: Write + Send> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            mounted: None,
            roster: BTreeMap::new(),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) {
        let host = self
            .mounted
            .as_ref()
            .map_or("unmounted", |element| element.id());
        let _ = writeln!(self.out, "[{host}] {text}");
    }

    fn roster_line(&self) -> String {
        self.roster
            .iter()
            .map(|(label, piines)| format!("{label}:{piines}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<W: Write + Send> ViewPort for ConsoleView<W> {
    fn mount(&mut self, host: &ElementRef) {
        self.mounted = Some(host.clone());
        self.line(format_args!("view mounted"));
    }

    fn add_participant(&mut self, label: ParticipantId) {
        self.roster.insert(label, 0);
        let roster = self.roster_line();
        self.line(format_args!("+ participant {label} | {roster}"));
    }

    fn remove_participant(&mut self, label: ParticipantId) {
        // Leave labels count participants, so they may point one past the newest.
        let removed = match self.roster.remove(&label) {
            Some(_) => Some(label),
            None => self.roster.pop_last().map(|(last, _)| last),
        };
        let Some(removed) = removed else {
            debug!(%label, "remove for empty roster");
            return;
        };
        let roster = self.roster_line();
        self.line(format_args!("- participant {removed} | {roster}"));
    }

    fn mark_reacting(&mut self, index: ParticipantId) {
        let Some((label, piines)) = self.roster.iter_mut().nth(index.0 as usize) else {
            debug!(%index, "reaction for unknown participant");
            return;
        };
        *piines += 1;
        let label = *label;
        self.line(format_args!("* participant {label} piine!"));
    }

    fn release(&mut self) {
        self.roster.clear();
        self.line(format_args!("view released"));
        self.mounted = None;
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(view: ConsoleView<Vec<u8>>) -> Vec<String> {
        String::from_utf8(view.into_inner())
            .expect("utf8")
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn renders_session_changes_under_the_mounted_host() {
        let mut view = ConsoleView::new(Vec::new());
        view.mount(&ElementRef::new("piine-view"));
        view.add_participant(ParticipantId(0));
        view.add_participant(ParticipantId(1));
        view.mark_reacting(ParticipantId(1));
        view.mark_reacting(ParticipantId(1));
        view.remove_participant(ParticipantId(2));
        view.release();

        assert_eq!(
            output(view),
            vec![
                "[piine-view] view mounted",
                "[piine-view] + participant 0 | 0:0",
                "[piine-view] + participant 1 | 0:0 1:0",
                "[piine-view] * participant 1 piine!",
                "[piine-view] * participant 1 piine!",
                "[piine-view] - participant 1 | 0:0",
                "[piine-view] view released",
            ]
        );
    }

    #[test]
    fn ignores_reactions_and_removals_without_participants() {
        let mut view = ConsoleView::new(Vec::new());
        view.mark_reacting(ParticipantId(0));
        view.remove_participant(ParticipantId(1));
        assert!(output(view).is_empty());
    }
}
