use std::sync::Arc;
use std::time::Duration;

use genpanel::{
    app::{
        GeneratePress, PanelController, PanelNotice, RemoteJobManager, RemoteJobUpdate,
        SampleFetchState,
    },
    domain::{GuidanceScale, PanelError, StepCount},
};
use gpui::{
    Context, Entity, Image, IntoElement, ObjectFit, Render, StyledImage, Subscription, Task,
    Timer, Window, div, img, prelude::*, px,
};
use gpui_component::{
    Disableable,
    button::{Button, ButtonVariants as _},
    input::{Input, InputEvent, InputState},
    label::Label,
    scroll::ScrollableElement,
    slider::{Slider, SliderEvent, SliderState},
};

use super::backend::build_remote_backend;
use super::state::{PanelStatus, needs_update_polling};
use super::theme::PanelTheme;
use super::utils::{gpui_image, log_generation_request_submission, prompt_level};
use super::{
    JOB_UPDATE_POLL_INTERVAL_MS, OUTPUT_IMAGE_HEIGHT_PX, PROMPT_EDITOR_ROWS, PROMPT_PLACEHOLDER,
    QUICK_PROMPTS_LABEL, SERVICE_UNAVAILABLE_MESSAGE, WINDOW_TITLE,
};

pub(super) struct GenPanelWindow {
    controller: PanelController,
    prompt_input: Entity<InputState>,
    _prompt_input_subscription: Subscription,
    steps_slider: Entity<SliderState>,
    _steps_slider_subscription: Subscription,
    guidance_slider: Entity<SliderState>,
    _guidance_slider_subscription: Subscription,
    job_manager: Option<Arc<RemoteJobManager>>,
    base_url: String,
    startup_notice: Option<String>,
    rendered_image: Option<Arc<Image>>,
    _update_poll_task: Task<()>,
    _notice_task: Task<()>,
}

impl GenPanelWindow {
    pub(super) fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let controller = PanelController::new();

        let prompt_input = cx.new(|cx| {
            InputState::new(window, cx)
                .multi_line(true)
                .rows(PROMPT_EDITOR_ROWS)
                .placeholder(PROMPT_PLACEHOLDER)
        });
        let prompt_input_subscription =
            cx.subscribe_in(&prompt_input, window, Self::on_prompt_input_event);

        let steps_slider = cx.new(|_| {
            SliderState::new()
                .min(f32::from(StepCount::MIN))
                .max(f32::from(StepCount::MAX))
                .step(1.0)
                .default_value(f32::from(controller.steps().get()))
        });
        let steps_slider_subscription =
            cx.subscribe_in(&steps_slider, window, Self::on_steps_slider_event);

        let guidance_slider = cx.new(|_| {
            SliderState::new()
                .min(GuidanceScale::MIN)
                .max(GuidanceScale::MAX)
                .step(GuidanceScale::STEP)
                .default_value(controller.guidance().value())
        });
        let guidance_slider_subscription =
            cx.subscribe_in(&guidance_slider, window, Self::on_guidance_slider_event);

        let backend = build_remote_backend();

        let mut this = Self {
            controller,
            prompt_input,
            _prompt_input_subscription: prompt_input_subscription,
            steps_slider,
            _steps_slider_subscription: steps_slider_subscription,
            guidance_slider,
            _guidance_slider_subscription: guidance_slider_subscription,
            job_manager: backend.job_manager,
            base_url: backend.base_url,
            startup_notice: backend.startup_notice,
            rendered_image: None,
            _update_poll_task: Task::ready(()),
            _notice_task: Task::ready(()),
        };
        this.mount(window, cx);
        this
    }

    fn mount(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if !self.controller.mount() {
            return;
        }

        let Some(job_manager) = self.job_manager.as_ref() else {
            self.controller.apply_samples(Err(PanelError::internal(
                SERVICE_UNAVAILABLE_MESSAGE,
            )));
            return;
        };

        match job_manager.fetch_samples() {
            Ok(()) => self.start_update_polling(window, cx),
            Err(error) => self.controller.apply_samples(Err(error)),
        }
    }

    fn on_prompt_input_event(
        &mut self,
        state: &Entity<InputState>,
        event: &InputEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if matches!(event, InputEvent::Change) {
            let value = state.read(cx).value().to_string();
            self.controller.set_prompt(value);
            cx.notify();
        }
    }

    fn on_steps_slider_event(
        &mut self,
        _state: &Entity<SliderState>,
        event: &SliderEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if let SliderEvent::Change(value) = event {
            self.controller.set_steps(StepCount::from_slider(value.start()));
            cx.notify();
        }
    }

    fn on_guidance_slider_event(
        &mut self,
        _state: &Entity<SliderState>,
        event: &SliderEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if let SliderEvent::Change(value) = event {
            self.controller
                .set_guidance(GuidanceScale::from_value(value.start()));
            cx.notify();
        }
    }

    fn on_sample_clicked(&mut self, index: usize, window: &mut Window, cx: &mut Context<Self>) {
        let Some(prompt) = self.controller.select_sample(index).map(str::to_string) else {
            return;
        };

        self.prompt_input
            .update(cx, |input, cx| input.set_value(prompt, window, cx));
        cx.notify();
    }

    fn on_generate_clicked(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let request = match self.controller.press_generate() {
            GeneratePress::Dispatch(request) => request,
            GeneratePress::PromptRequired(notice) => {
                self.show_notice(notice, window, cx);
                self.prompt_input
                    .update(cx, |input, cx| input.focus(window, cx));
                return;
            }
            GeneratePress::Busy => return,
        };

        self.rendered_image = None;

        let dispatched = match self.job_manager.as_ref() {
            Some(job_manager) => job_manager.submit_generation(request.clone()),
            None => Err(PanelError::internal(SERVICE_UNAVAILABLE_MESSAGE)),
        };

        match dispatched {
            Ok(job_id) => {
                log_generation_request_submission(job_id, &request);
                self.controller.mark_dispatched(job_id);
                self.start_update_polling(window, cx);
            }
            Err(error) => {
                if let Some(notice) = self.controller.fail_dispatch(error) {
                    self.show_notice(notice, window, cx);
                }
            }
        }

        cx.notify();
    }

    fn start_update_polling(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self._update_poll_task = cx.spawn_in(window, async move |view, window| {
            loop {
                Timer::after(Duration::from_millis(JOB_UPDATE_POLL_INTERVAL_MS)).await;
                let keep_polling = match view
                    .update_in(window, |view, window, cx| view.poll_remote_updates(window, cx))
                {
                    Ok(keep_polling) => keep_polling,
                    Err(_) => break,
                };

                if !keep_polling {
                    break;
                }
            }
        });
    }

    fn poll_remote_updates(&mut self, window: &mut Window, cx: &mut Context<Self>) -> bool {
        let updates = self
            .job_manager
            .as_ref()
            .map(|job_manager| job_manager.drain_updates())
            .unwrap_or_default();

        if !updates.is_empty() {
            for update in updates {
                self.apply_remote_update(update, window, cx);
            }

            cx.notify();
        }

        needs_update_polling(
            self.controller.submission(),
            self.controller.sample_fetch_state(),
        )
    }

    fn apply_remote_update(
        &mut self,
        update: RemoteJobUpdate,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        match update {
            RemoteJobUpdate::SamplesFetched { result } => self.controller.apply_samples(result),
            RemoteJobUpdate::GenerationSettled { job_id, result } => {
                let notice = self.controller.complete_generation(job_id, result);
                self.rendered_image = self.controller.output_image().map(gpui_image);
                if let Some(notice) = notice {
                    self.show_notice(notice, window, cx);
                }
            }
        }
    }

    fn show_notice(&mut self, notice: PanelNotice, window: &mut Window, cx: &mut Context<Self>) {
        let answer = window.prompt(
            prompt_level(notice.level),
            &notice.message,
            notice.detail.as_deref(),
            &["OK"],
            cx,
        );
        self._notice_task = cx.spawn(async move |_, _| {
            let _ = answer.await;
        });
    }
}

impl Render for GenPanelWindow {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.global::<PanelTheme>().clone();
        let colors = theme.colors;
        let view = self.controller.view();
        let status = PanelStatus::from_submission(self.controller.submission());
        let busy = !view.generate_enabled;
        let samples_pending = self.controller.sample_fetch_state() == SampleFetchState::Pending;

        let output = match (&self.rendered_image, view.output.message()) {
            (Some(image), _) => div()
                .flex()
                .justify_center()
                .child(
                    img(Arc::clone(image))
                        .w_full()
                        .h(px(OUTPUT_IMAGE_HEIGHT_PX))
                        .object_fit(ObjectFit::Contain),
                )
                .into_any_element(),
            (None, message) => div()
                .flex()
                .items_center()
                .justify_center()
                .h(px(OUTPUT_IMAGE_HEIGHT_PX))
                .text_color(colors.muted_foreground)
                .child(message.unwrap_or_default())
                .into_any_element(),
        };

        div()
            .size_full()
            .overflow_y_scrollbar()
            .overflow_x_hidden()
            .flex()
            .flex_col()
            .gap_3()
            .p_4()
            .bg(colors.surface_background)
            .text_color(colors.surface_foreground)
            .child(Label::new(WINDOW_TITLE))
            .child(Input::new(&self.prompt_input))
            .child(
                div()
                    .flex()
                    .flex_col()
                    .gap_2()
                    .child(Label::new(QUICK_PROMPTS_LABEL))
                    .children(
                        samples_pending
                            .then(|| div().text_color(colors.muted_foreground).child("...")),
                    )
                    .child(
                        div()
                            .id("quick-prompts")
                            .flex()
                            .flex_wrap()
                            .gap_2()
                            .children(view.samples.iter().enumerate().map(|(index, sample)| {
                                Button::new(("quick-prompt", index))
                                    .label(sample.clone())
                                    .on_click(cx.listener(move |this, _, window, cx| {
                                        this.on_sample_clicked(index, window, cx)
                                    }))
                            })),
                    ),
            )
            .child(
                div()
                    .flex()
                    .flex_col()
                    .gap_2()
                    .p_3()
                    .rounded(theme.radius.panel)
                    .border_1()
                    .border_color(colors.panel_border)
                    .bg(colors.panel_background)
                    .child(Label::new(view.steps_label.clone()))
                    .child(Slider::new(&self.steps_slider))
                    .child(Label::new(view.guidance_label.clone()))
                    .child(Slider::new(&self.guidance_slider)),
            )
            .child(
                div()
                    .flex()
                    .items_center()
                    .justify_between()
                    .gap_3()
                    .child(
                        Button::new("generate-button")
                            .primary()
                            .label(view.generate_label)
                            .loading(busy)
                            .disabled(busy)
                            .on_click(cx.listener(|this, _, window, cx| {
                                this.on_generate_clicked(window, cx)
                            })),
                    )
                    .child(div().text_color(status.color(&colors)).child(status.label())),
            )
            .child(
                div()
                    .p_3()
                    .rounded(theme.radius.panel)
                    .border_1()
                    .border_color(colors.panel_border)
                    .bg(colors.panel_active_background)
                    .child(output),
            )
            .child(
                div()
                    .text_color(colors.muted_foreground)
                    .child(format!("Service: {}", self.base_url)),
            )
            .children(self.startup_notice.iter().map(|notice| {
                div()
                    .text_color(colors.accent_foreground)
                    .child(format!("Backend: {notice}"))
            }))
    }
}
