use super::*;
use crate::controller::events::UiErrorContext;
use client_core::{FormMode, RefreshTicket};
use crossbeam_channel::bounded;
use shared::domain::TokenRecord;

const SERVER_URL: &str = "http://127.0.0.1:8443";

struct Harness {
    app: TokenManagerApp,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
}

impl Harness {
    /// App whose startup connect has not been answered yet.
    fn unconnected() -> Self {
        let (cmd_tx, cmd_rx) = bounded(64);
        let (ui_tx, ui_rx) = bounded(64);
        let app = TokenManagerApp::new(cmd_tx, ui_rx, SERVER_URL.to_string());
        Self { app, cmd_rx, ui_tx }
    }

    fn new() -> Self {
        let mut harness = Self::unconnected();
        harness.deliver(UiEvent::Connected {
            server_url: SERVER_URL.to_string(),
        });
        harness
    }

    fn drain(&self) -> Vec<BackendCommand> {
        self.cmd_rx.try_iter().collect()
    }

    fn deliver(&mut self, event: UiEvent) {
        self.ui_tx.send(event).expect("send event");
        self.app.process_ui_events();
    }

    /// Answers the most recent list request with `records`.
    fn load(&mut self, records: Vec<TokenRecord>) {
        let ticket = last_ticket(&self.drain()).expect("list request queued");
        self.deliver(UiEvent::TokensLoaded { ticket, records });
    }
}

fn last_ticket(commands: &[BackendCommand]) -> Option<RefreshTicket> {
    commands.iter().rev().find_map(|cmd| match cmd {
        BackendCommand::ListTokens { ticket } => Some(*ticket),
        _ => None,
    })
}

fn gold() -> TokenRecord {
    TokenRecord::new(TokenId(1), "Gold", "GLD", 1000)
}

fn type_into(app: &mut TokenManagerApp, field: FormField, raw: &str) {
    match field {
        FormField::Name => app.inputs.name = raw.to_string(),
        FormField::Symbol => app.inputs.symbol = raw.to_string(),
        FormField::InitialSupply => app.inputs.supply = raw.to_string(),
    }
    app.form.update_field(field, raw);
}

#[test]
fn startup_requests_the_list_only_after_connecting() {
    let mut harness = Harness::unconnected();
    assert_eq!(
        harness.drain(),
        vec![BackendCommand::Connect {
            server_url: SERVER_URL.to_string()
        }]
    );
    assert_eq!(harness.app.inputs.supply, "0");

    harness.deliver(UiEvent::Connected {
        server_url: SERVER_URL.to_string(),
    });
    let commands = harness.drain();
    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], BackendCommand::ListTokens { .. }));
}

#[test]
fn failed_reconnect_leaves_the_list_empty() {
    let mut harness = Harness::new();
    harness.load(vec![gold()]);
    assert_eq!(harness.app.list.snapshot(), &[gold()]);

    harness.app.server_url_input = "ftp://registry.local".to_string();
    harness.app.connect();
    assert_eq!(
        harness.drain(),
        vec![BackendCommand::Connect {
            server_url: "ftp://registry.local".to_string()
        }]
    );
    assert!(harness.app.list.snapshot().is_empty());

    harness.deliver(UiEvent::Error(UiError::from_message(
        UiErrorContext::Connect,
        "server URL must start with http:// or https://",
    )));
    assert!(harness.drain().is_empty(), "no list request after a failed connect");
    assert!(harness.app.list.snapshot().is_empty());
    assert!(matches!(harness.app.status, StatusLine::Error(_)));
    assert_eq!(harness.app.connected_url.as_deref(), Some(SERVER_URL));
}

#[test]
fn add_waits_for_completion_before_resetting() {
    let mut harness = Harness::new();
    harness.load(Vec::new());

    type_into(&mut harness.app, FormField::Name, "Gold");
    type_into(&mut harness.app, FormField::Symbol, "GLD");
    type_into(&mut harness.app, FormField::InitialSupply, "1000");
    harness.app.submit();

    assert_eq!(
        harness.drain(),
        vec![BackendCommand::AddToken {
            name: "Gold".to_string(),
            symbol: "GLD".to_string(),
            initial_supply: 1000.0,
        }]
    );
    assert_eq!(harness.app.gate.in_flight(), Some(MutationKind::Submit));
    assert_eq!(harness.app.form.draft().name, "Gold");

    harness.app.submit();
    assert!(harness.drain().is_empty(), "second submit while busy");

    harness.deliver(UiEvent::SubmitFinished(Ok(SubmitOutcome::Added(TokenId(1)))));
    assert!(!harness.app.gate.is_busy());
    assert!(harness.app.form.draft().is_empty());
    assert_eq!(harness.app.inputs.name, "");
    assert_eq!(harness.app.inputs.supply, "0");

    harness.load(vec![gold()]);
    assert_eq!(harness.app.list.snapshot(), &[gold()]);
}

#[test]
fn failed_submit_keeps_edit_mode_and_inputs() {
    let mut harness = Harness::new();
    harness.load(vec![gold()]);

    harness.app.start_edit(TokenId(1));
    assert_eq!(harness.app.inputs.name, "Gold");
    assert_eq!(harness.app.inputs.supply, "1000");
    type_into(&mut harness.app, FormField::InitialSupply, "2000");
    harness.app.submit();
    match harness.drain().as_slice() {
        [BackendCommand::UpdateToken {
            token_id: TokenId(1),
            total_supply,
            ..
        }] => assert_eq!(*total_supply, 2000.0),
        other => panic!("unexpected commands {other:?}"),
    }

    harness.deliver(UiEvent::SubmitFinished(Err(UiError::from_message(
        UiErrorContext::Submit,
        "connection reset",
    ))));
    assert!(!harness.app.gate.is_busy());
    assert_eq!(harness.app.form.mode(), FormMode::Editing(TokenId(1)));
    assert_eq!(harness.app.inputs.supply, "2000");
    assert!(matches!(harness.app.status, StatusLine::Error(_)));
    assert!(harness.drain().is_empty(), "no refresh after failure");
}

#[test]
fn blank_create_submit_resets_and_refreshes_without_adding() {
    let mut harness = Harness::new();
    harness.load(Vec::new());

    type_into(&mut harness.app, FormField::Name, "Gold");
    harness.app.submit();

    let commands = harness.drain();
    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], BackendCommand::ListTokens { .. }));
    assert!(!harness.app.gate.is_busy());
    assert_eq!(harness.app.inputs.name, "");
}

#[test]
fn delete_needs_confirmation() {
    let mut harness = Harness::new();
    harness.load(vec![gold()]);

    harness.app.request_delete(TokenId(1));
    assert_eq!(harness.app.pending_delete, Some(TokenId(1)));
    harness.app.resolve_delete(false);
    assert_eq!(harness.app.pending_delete, None);
    assert!(harness.drain().is_empty());

    harness.app.request_delete(TokenId(1));
    harness.app.resolve_delete(true);
    assert_eq!(
        harness.drain(),
        vec![BackendCommand::DeleteToken { token_id: TokenId(1) }]
    );
    assert_eq!(harness.app.gate.in_flight(), Some(MutationKind::Delete));

    harness.deliver(UiEvent::DeleteFinished(Ok(TokenId(1))));
    assert!(!harness.app.gate.is_busy());
    harness.load(Vec::new());
    assert!(harness.app.list.snapshot().is_empty());
}

#[test]
fn stale_list_is_ignored() {
    let mut harness = Harness::new();
    let older = last_ticket(&harness.drain()).expect("ticket queued on connect");
    harness.app.request_refresh();
    let newer = last_ticket(&harness.drain()).expect("second ticket");

    harness.deliver(UiEvent::TokensLoaded {
        ticket: newer,
        records: vec![gold()],
    });
    harness.deliver(UiEvent::TokensLoaded {
        ticket: older,
        records: Vec::new(),
    });
    assert_eq!(harness.app.list.snapshot(), &[gold()]);
}

#[test]
fn deleting_edit_target_is_reported_in_status() {
    let mut harness = Harness::new();
    harness.load(vec![gold()]);
    harness.app.start_edit(TokenId(1));

    harness.app.request_delete(TokenId(1));
    harness.app.resolve_delete(true);
    harness.drain();
    harness.deliver(UiEvent::DeleteFinished(Ok(TokenId(1))));
    harness.load(Vec::new());

    assert_eq!(harness.app.form.mode(), FormMode::Editing(TokenId(1)));
    match &harness.app.status {
        StatusLine::Info(message) => assert!(message.contains("no longer exists")),
        other => panic!("unexpected status {other:?}"),
    }
}

#[test]
fn connected_url_is_what_gets_persisted() {
    let mut harness = Harness::new();
    harness.deliver(UiEvent::Connected {
        server_url: "http://registry.local:8443".to_string(),
    });
    assert_eq!(harness.app.server_url_input, "http://registry.local:8443");
    assert_eq!(
        harness.app.connected_url.as_deref(),
        Some("http://registry.local:8443")
    );
}
