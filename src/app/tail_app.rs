//! The plot window: drains the point buffer once per frame and draws the series.

use std::ops::RangeInclusive;

use eframe::egui;
use egui_plot::{AxisHints, GridMark, HPlacement, Legend, Line, Plot};
use log::info;

use crate::autoscale::AxisId;
use crate::buffer::{FlushScheduler, PointBuffer};
use crate::config::TailPlotConfig;
use crate::controllers::TailController;
use crate::data::axis_format::AxisFormatter;
use crate::data::field::Axis;
use crate::flush::{FlushStats, Flusher};

use super::series::{PlotState, Y2Mapping};

/// An append from the reader thread wakes the UI thread, which flushes on
/// its next frame. egui merges repaint requests that arrive before it.
impl FlushScheduler for egui::Context {
    fn schedule_flush(&self) {
        self.request_repaint();
    }
}

fn tick_label(formatter: &AxisFormatter, mark: GridMark, range: &RangeInclusive<f64>) -> String {
    formatter.format(mark.value, (*range.start(), *range.end()), mark.step_size)
}

/// eframe application showing one tailed source.
pub struct TailPlotApp {
    flusher: Flusher,
    state: PlotState,
    control: TailController,
    restartable: bool,
    x_formatter: AxisFormatter,
    y_formatter: AxisFormatter,
    y2_formatter: AxisFormatter,
    y2_map: Option<Y2Mapping>,
}

impl TailPlotApp {
    pub fn new(config: &TailPlotConfig, buffer: PointBuffer, control: TailController) -> Self {
        Self {
            flusher: Flusher::new(buffer),
            state: PlotState::new(),
            control,
            restartable: config.source.is_restartable(),
            x_formatter: config.x_formatter.clone(),
            y_formatter: config.y_formatter.clone(),
            y2_formatter: config.y2_formatter.clone(),
            y2_map: None,
        }
    }

    pub fn state(&self) -> &PlotState {
        &self.state
    }

    pub fn controller(&self) -> &TailController {
        &self.control
    }

    /// Apply everything the reader appended since the last frame.
    pub fn flush(&mut self) -> FlushStats {
        let stats = self.flusher.flush(&mut self.state);
        if stats.restarts > 0 {
            self.y2_map = None;
        }
        stats
    }

    pub fn set_auto_scale(&mut self, axis: AxisId, enabled: bool) {
        self.flusher.set_auto_scale(axis, enabled, &mut self.state);
    }

    pub fn is_auto_scale(&self, axis: AxisId) -> bool {
        self.flusher.autoscale().is_auto_scale(axis)
    }

    fn has_y2(&self) -> bool {
        self.state
            .series()
            .iter()
            .any(|s| s.axis() == Axis::Secondary)
    }

    fn side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("tailplot_controls")
            .resizable(false)
            .show(ctx, |ui| {
                ui.heading("Auto-scale");
                let mut axes = vec![(AxisId::X, "X"), (AxisId::Y, "Y")];
                if self.has_y2() {
                    axes.push((AxisId::Y2, "Y2"));
                }
                for (axis, label) in axes {
                    let mut enabled = self.is_auto_scale(axis);
                    if ui.checkbox(&mut enabled, label).changed() {
                        self.set_auto_scale(axis, enabled);
                    }
                }

                ui.separator();
                ui.add_enabled_ui(self.restartable, |ui| {
                    let mut auto_restart = self.control.auto_restart();
                    if ui
                        .checkbox(&mut auto_restart, "Auto-restart if file shrinks")
                        .changed()
                    {
                        self.control.set_auto_restart(auto_restart);
                    }
                    if ui
                        .button("Restart")
                        .on_hover_text("Read the file again from the start")
                        .clicked()
                    {
                        info!("restart requested");
                        self.control.request_restart();
                    }
                });

                ui.separator();
                ui.label(format!("Points: {}", self.state.points()));
                if self.state.restarts() > 0 {
                    ui.label(format!("Restarts: {}", self.state.restarts()));
                }
            });
    }

    fn plot(&mut self, ui: &mut egui::Ui) {
        let set_x = if self.is_auto_scale(AxisId::X) {
            self.state.bounds(AxisId::X)
        } else {
            None
        };
        // With everything on Y2 the primary range simply mirrors it.
        let y_bounds = self
            .state
            .bounds(AxisId::Y)
            .or(self.state.bounds(AxisId::Y2));
        let set_y = if self.is_auto_scale(AxisId::Y) {
            y_bounds
        } else {
            None
        };

        let has_y2 = self.has_y2();
        if has_y2 {
            if let Some(y2) = self.state.bounds(AxisId::Y2) {
                let auto_y2 = self.is_auto_scale(AxisId::Y2);
                let map = self.y2_map.get_or_insert(Y2Mapping {
                    y: y_bounds.unwrap_or(y2),
                    y2,
                });
                if auto_y2 {
                    map.y2 = y2;
                }
                if let Some(y) = set_y {
                    map.y = y;
                }
            }
        }
        let map = self.y2_map;

        let xf = self.x_formatter.clone();
        let yf = self.y_formatter.clone();
        let mut y_axes =
            vec![AxisHints::new_y().formatter(move |mark, range| tick_label(&yf, mark, range))];
        if has_y2 {
            let y2f = self.y2_formatter.clone();
            y_axes.push(
                AxisHints::new_y()
                    .label("Y2")
                    .placement(HPlacement::Right)
                    .formatter(move |mark, range| match map {
                        Some(m) => {
                            let scale = ((m.y2.1 - m.y2.0) / (m.y.1 - m.y.0)).abs();
                            y2f.format(
                                m.to_secondary(mark.value),
                                (m.y2.0, m.y2.1),
                                mark.step_size * scale,
                            )
                        }
                        None => tick_label(&y2f, mark, range),
                    }),
            );
        }

        let plot = Plot::new("tailplot")
            .legend(Legend::default())
            .allow_boxed_zoom(true)
            .x_axis_formatter(move |mark, range| tick_label(&xf, mark, range))
            .custom_y_axes(y_axes);

        let series = self.state.series();
        let response = plot.show(ui, |plot_ui| {
            let resp = plot_ui.response();
            let scroll = resp.ctx.input(|i| i.raw_scroll_delta);
            let zoom = resp.ctx.input(|i| i.zoom_delta());
            let manual = resp.dragged_by(egui::PointerButton::Primary)
                || resp.drag_stopped_by(egui::PointerButton::Secondary)
                || (resp.hovered() && (scroll != egui::Vec2::ZERO || zoom != 1.0));
            let reset = resp.double_clicked();

            if !manual {
                if let Some((lo, hi)) = set_x {
                    plot_ui.set_plot_bounds_x(lo..=hi);
                }
                if let Some((lo, hi)) = set_y {
                    plot_ui.set_plot_bounds_y(lo..=hi);
                }
            }

            for s in series {
                for run in s.segments() {
                    let points: Vec<[f64; 2]> = match (s.axis(), map) {
                        (Axis::Secondary, Some(m)) => {
                            run.iter().map(|&[x, v]| [x, m.to_primary(v)]).collect()
                        }
                        _ => run.to_vec(),
                    };
                    plot_ui.line(
                        Line::new(s.field.name.clone(), points)
                            .color(s.look.color)
                            .width(s.look.width),
                    );
                }
            }
            (manual, reset)
        });

        let (manual, reset) = response.inner;
        let bounds = response.transform.bounds();
        let view_y = (bounds.min()[1], bounds.max()[1]);
        if manual {
            for axis in AxisId::ALL {
                self.set_auto_scale(axis, false);
            }
            if let Some(m) = self.y2_map.as_mut() {
                m.follow(view_y);
            }
        } else if let Some(m) = self.y2_map.as_mut() {
            m.y = view_y;
        }
        if reset {
            for axis in AxisId::ALL {
                self.set_auto_scale(axis, true);
            }
        }
    }
}

impl eframe::App for TailPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.flush();
        self.side_panel(ctx);
        egui::CentralPanel::default().show(ctx, |ui| self.plot(ui));
    }
}
