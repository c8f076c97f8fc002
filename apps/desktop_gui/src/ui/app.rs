use std::time::Duration;

use client_core::{
    FormController, FormField, ListSynchronizer, MutationGate, MutationKind, RefreshOutcome,
    SubmitOutcome, SubmitPlan, DELETE_PROMPT,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::domain::TokenId;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

pub const SETTINGS_STORAGE_KEY: &str = "token_manager.settings";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSettings {
    pub server_url: String,
}

/// Raw text behind the form's inputs. The draft holds the coerced values;
/// these strings are only rewritten when the form resets or starts an edit.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct FieldInputs {
    name: String,
    symbol: String,
    supply: String,
}

#[derive(Debug, Clone, PartialEq)]
enum StatusLine {
    Info(String),
    Error(UiError),
}

pub struct TokenManagerApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    server_url_input: String,
    connected_url: Option<String>,
    form: FormController,
    list: ListSynchronizer,
    gate: MutationGate,
    inputs: FieldInputs,
    pending_delete: Option<TokenId>,
    status: StatusLine,
}

impl TokenManagerApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        server_url: String,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            server_url_input: server_url,
            connected_url: None,
            form: FormController::new(),
            list: ListSynchronizer::new(),
            gate: MutationGate::default(),
            inputs: FieldInputs::default(),
            pending_delete: None,
            status: StatusLine::Info("Connecting...".to_string()),
        };
        app.sync_inputs();
        app.connect();
        app
    }

    fn queue(&mut self, cmd: BackendCommand) -> bool {
        let mut status = String::new();
        let queued = dispatch_backend_command(&self.cmd_tx, cmd, &mut status);
        if !queued {
            self.status = StatusLine::Info(status);
        }
        queued
    }

    /// Points the worker at the URL in the server box. The list reloads once
    /// the worker reports `Connected`.
    fn connect(&mut self) {
        self.list.clear();
        self.form.cancel();
        self.sync_inputs();
        self.pending_delete = None;
        let server_url = self.server_url_input.trim().to_string();
        self.queue(BackendCommand::Connect { server_url });
    }

    fn request_refresh(&mut self) {
        let ticket = self.list.begin_refresh();
        self.queue(BackendCommand::ListTokens { ticket });
    }

    fn sync_inputs(&mut self) {
        let draft = self.form.draft();
        self.inputs = FieldInputs {
            name: draft.name.clone(),
            symbol: draft.symbol.clone(),
            supply: draft.supply_text(),
        };
    }

    fn reset_form(&mut self) {
        self.form.complete_submit();
        self.sync_inputs();
    }

    fn start_edit(&mut self, token_id: TokenId) {
        if self.gate.is_busy() {
            return;
        }
        let Some(record) = self.list.record(token_id).cloned() else {
            return;
        };
        self.form.begin_edit(&record);
        self.sync_inputs();
    }

    fn cancel_edit(&mut self) {
        self.form.cancel();
        self.sync_inputs();
    }

    fn submit(&mut self) {
        if self.gate.is_busy() {
            return;
        }
        let cmd = match self.form.plan_submit() {
            SubmitPlan::Skip => {
                self.reset_form();
                self.request_refresh();
                self.status =
                    StatusLine::Info("Name and symbol are required to add a token".to_string());
                return;
            }
            SubmitPlan::Add {
                name,
                symbol,
                initial_supply,
            } => BackendCommand::AddToken {
                name,
                symbol,
                initial_supply,
            },
            SubmitPlan::Update {
                token_id,
                name,
                symbol,
                total_supply,
            } => BackendCommand::UpdateToken {
                token_id,
                name,
                symbol,
                total_supply,
            },
        };
        self.begin_mutation(MutationKind::Submit, cmd);
    }

    fn request_delete(&mut self, token_id: TokenId) {
        if !self.gate.is_busy() {
            self.pending_delete = Some(token_id);
        }
    }

    fn resolve_delete(&mut self, confirmed: bool) {
        let Some(token_id) = self.pending_delete.take() else {
            return;
        };
        if confirmed {
            self.begin_mutation(MutationKind::Delete, BackendCommand::DeleteToken { token_id });
        }
    }

    fn begin_mutation(&mut self, kind: MutationKind, cmd: BackendCommand) {
        if self.gate.try_begin(kind).is_err() {
            return;
        }
        if !self.queue(cmd) {
            self.gate.finish();
        }
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Connected { server_url } => {
                self.status = StatusLine::Info(format!("Connected to {server_url}"));
                self.server_url_input = server_url.clone();
                self.connected_url = Some(server_url);
                self.request_refresh();
            }
            UiEvent::TokensLoaded { ticket, records } => {
                let outcome = self.list.apply_refresh(ticket, records);
                if matches!(outcome, RefreshOutcome::Applied { .. }) && self.edit_target_missing() {
                    self.status = StatusLine::Info(
                        "The token being edited no longer exists; cancel or save to see the error"
                            .to_string(),
                    );
                }
            }
            UiEvent::SubmitFinished(result) => {
                self.gate.finish();
                match result {
                    Ok(outcome) => {
                        self.reset_form();
                        self.request_refresh();
                        self.status = StatusLine::Info(match outcome {
                            SubmitOutcome::Added(token_id) => format!("Added token {token_id}"),
                            SubmitOutcome::Updated(token_id) => format!("Updated token {token_id}"),
                            SubmitOutcome::Skipped => "Nothing submitted".to_string(),
                        });
                    }
                    Err(err) => self.show_error(err),
                }
            }
            UiEvent::DeleteFinished(result) => {
                self.gate.finish();
                match result {
                    Ok(token_id) => {
                        if self.form.edit_target() == Some(token_id) {
                            tracing::warn!(
                                token_id = token_id.0,
                                "deleted token is still the edit target"
                            );
                        }
                        self.request_refresh();
                        self.status = StatusLine::Info(format!("Deleted token {token_id}"));
                    }
                    Err(err) => self.show_error(err),
                }
            }
            UiEvent::Error(err) => self.show_error(err),
        }
    }

    fn show_error(&mut self, err: UiError) {
        tracing::warn!(context = ?err.context(), "{}", err.message());
        self.status = StatusLine::Error(err);
    }

    fn edit_target_missing(&self) -> bool {
        self.form
            .edit_target()
            .is_some_and(|token_id| self.list.record(token_id).is_none())
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.handle_event(event);
        }
    }

    fn show_server_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("server_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Server");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.server_url_input)
                        .desired_width(280.0)
                        .hint_text(client_core::DEFAULT_SERVER_URL),
                );
                let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Connect").clicked() || enter {
                    self.connect();
                }
                if ui.button("Refresh").clicked() {
                    self.request_refresh();
                }
            });
        });
    }

    fn show_status_line(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_line").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match &self.status {
                    StatusLine::Info(message) => {
                        ui.label(message);
                    }
                    StatusLine::Error(err) => {
                        ui.colored_label(egui::Color32::from_rgb(220, 110, 110), err.status_line());
                    }
                }
                if let Some(kind) = self.gate.in_flight() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.spinner();
                        ui.label(format!("{kind:?} in progress"));
                    });
                }
            });
        });
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        let busy = self.gate.is_busy();
        let mut edits: Vec<(FormField, String)> = Vec::new();
        let mut submit = false;
        let mut cancel = false;

        ui.heading(match self.form.edit_target() {
            Some(token_id) => format!("Edit token {token_id}"),
            None => "New token".to_string(),
        });
        ui.add_enabled_ui(!busy, |ui| {
            egui::Grid::new("token_form")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    let fields = [
                        (FormField::Name, "Token Name", &mut self.inputs.name),
                        (FormField::Symbol, "Token Symbol", &mut self.inputs.symbol),
                        (FormField::InitialSupply, "Initial Supply", &mut self.inputs.supply),
                    ];
                    for (field, label, text) in fields {
                        ui.label(label);
                        let response = ui.add(egui::TextEdit::singleline(text).hint_text(label));
                        if response.changed() {
                            edits.push((field, text.clone()));
                        }
                        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                            submit = true;
                        }
                        ui.end_row();
                    }
                });
            ui.horizontal(|ui| {
                if ui.button(self.form.submit_label()).clicked() {
                    submit = true;
                }
                if self.form.shows_cancel() && ui.button("Cancel").clicked() {
                    cancel = true;
                }
            });
        });

        for (field, raw) in edits {
            self.form.update_field(field, &raw);
        }
        if cancel {
            self.cancel_edit();
        } else if submit {
            self.submit();
        }
    }

    fn show_token_table(&mut self, ui: &mut egui::Ui) {
        let busy = self.gate.is_busy();
        let editing = self.form.edit_target();
        let mut edit = None;
        let mut delete = None;

        ui.heading("Tokens");
        if self.list.snapshot().is_empty() {
            ui.label("No tokens yet.");
            return;
        }
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("token_table")
                .num_columns(5)
                .striped(true)
                .spacing([16.0, 6.0])
                .show(ui, |ui| {
                    for header in ["ID", "Name", "Symbol", "Supply", ""] {
                        ui.strong(header);
                    }
                    ui.end_row();

                    for record in self.list.snapshot() {
                        let label = record.token_id.to_string();
                        if editing == Some(record.token_id) {
                            ui.strong(label);
                        } else {
                            ui.label(label);
                        }
                        ui.label(record.name.as_str());
                        ui.label(record.symbol.as_str());
                        ui.label(record.supply_label());
                        ui.horizontal(|ui| {
                            if ui.add_enabled(!busy, egui::Button::new("Edit")).clicked() {
                                edit = Some(record.token_id);
                            }
                            if ui.add_enabled(!busy, egui::Button::new("Delete")).clicked() {
                                delete = Some(record.token_id);
                            }
                        });
                        ui.end_row();
                    }
                });
        });

        if let Some(token_id) = edit {
            self.start_edit(token_id);
        }
        if let Some(token_id) = delete {
            self.request_delete(token_id);
        }
    }

    fn show_delete_confirmation(&mut self, ctx: &egui::Context) {
        let Some(token_id) = self.pending_delete else {
            return;
        };
        let mut decision = None;
        egui::Window::new("Confirm delete")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(DELETE_PROMPT);
                if let Some(record) = self.list.record(token_id) {
                    ui.label(format!("{} ({})", record.name, record.symbol));
                }
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });
        if let Some(confirmed) = decision {
            self.resolve_delete(confirmed);
        }
    }
}

impl eframe::App for TokenManagerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_server_bar(ctx);
        self.show_status_line(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_form(ui);
            ui.separator();
            self.show_token_table(ui);
        });
        self.show_delete_confirmation(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedSettings {
            server_url: self
                .connected_url
                .clone()
                .unwrap_or_else(|| self.server_url_input.trim().to_string()),
        };
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
