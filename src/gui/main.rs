#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;

use eframe::egui;

use metadata_viewer::config::Config;
use metadata_viewer::pipeline::{ImageFileSource, MetadataReport, load_metadata};
use metadata_viewer::projection::{DisplayNode, IptcListing, item_text};

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([960.0, 640.0])
        .with_min_inner_size([600.0, 400.0])
        .with_drag_and_drop(true);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Metadata Viewer",
        options,
        Box::new(|cc| Ok(Box::new(App::new(cc)))),
    )
}

// ── Main application state ──────────────────────────────────────────

struct App {
    config: Config,
    /// What the two views currently show.
    report: Option<MetadataReport>,
    /// File chosen this frame, loaded at the start of the next one.
    pending: Option<PathBuf>,
    /// Bumped on every load so the tree's open/closed state starts fresh.
    generation: u64,
    status: String,
}

impl App {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = Config::load(None).unwrap_or_default();

        Self {
            config,
            report: None,
            pending: None,
            generation: 0,
            status: "Ready — drop an image or click Open".into(),
        }
    }

    fn open_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &self.config.viewer.extensions)
            .add_filter("All files", &["*"])
            .pick_file()
        {
            self.select(path);
        }
    }

    /// Clear both views and queue the load for the next frame, so the wait
    /// cursor is on screen while it runs.
    fn select(&mut self, path: PathBuf) {
        self.report = Some(MetadataReport::cleared(&path));
        self.status = format!("Loading {}...", path.display());
        self.pending = Some(path);
    }

    fn run_pending_load(&mut self) {
        let Some(path) = self.pending.take() else {
            return;
        };
        let report = load_metadata(&ImageFileSource, &path);
        self.status = format!(
            "{} — {} IPTC tag(s)",
            path.display(),
            report.iptc.tag_count()
        );
        self.report = Some(report);
        self.generation += 1;
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.run_pending_load();

        // Handle dropped files
        let dropped: Option<PathBuf> = ctx.input(|i| {
            i.raw.dropped_files.iter()
                .filter_map(|f| f.path.clone())
                .next()
        });
        if let Some(path) = dropped {
            self.select(path);
        }

        if self.pending.is_some() {
            ctx.set_cursor_icon(egui::CursorIcon::Wait);
            ctx.request_repaint();
        }

        // ── Top bar ─────────────────────────────────────────────────
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                if ui.add_enabled(self.pending.is_none(), egui::Button::new("📂 Open...")).clicked() {
                    self.open_file();
                }
                ui.separator();
                ui.label(&self.status);
            });
            ui.add_space(4.0);
        });

        let Some(report) = &self.report else {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("Drop an image here\nor click Open")
                        .size(18.0)
                        .color(egui::Color32::GRAY));
                });
            });
            return;
        };

        // ── Left panel: IPTC ────────────────────────────────────────
        egui::SidePanel::left("iptc")
            .default_width(320.0)
            .min_width(200.0)
            .show(ctx, |ui| {
                ui.heading("IPTC");
                ui.separator();
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| show_iptc(ui, &report.iptc));
            });

        // ── Central panel: XMP ──────────────────────────────────────
        let expand = self.config.viewer.expand_xmp_tree;
        let generation = self.generation;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("XMP");
            ui.separator();
            egui::ScrollArea::both()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.push_id(generation, |ui| {
                        for (i, node) in report.xmp.iter().enumerate() {
                            show_tree_node(ui, i, node, expand);
                        }
                    });
                });
        });
    }
}

fn show_iptc(ui: &mut egui::Ui, listing: &IptcListing) {
    match listing {
        IptcListing::Message(text) => {
            ui.label(text);
        }
        IptcListing::Groups(groups) if groups.is_empty() => {
            ui.label(egui::RichText::new("No IPTC metadata").color(egui::Color32::GRAY));
        }
        IptcListing::Groups(groups) => {
            for group in groups {
                egui::CollapsingHeader::new(egui::RichText::new(group.header()).strong())
                    .id_salt(group.section)
                    .default_open(true)
                    .show(ui, |ui| {
                        for tag in &group.tags {
                            ui.label(item_text(tag));
                        }
                    });
            }
        }
    }
}

fn show_tree_node(ui: &mut egui::Ui, index: usize, node: &DisplayNode, expand: bool) {
    if node.children.is_empty() {
        ui.label(&node.label);
        return;
    }
    ui.push_id(index, |ui| {
        egui::CollapsingHeader::new(&node.label)
            .default_open(expand)
            .show(ui, |ui| {
                for (i, child) in node.children.iter().enumerate() {
                    show_tree_node(ui, i, child, expand);
                }
            });
    });
}
