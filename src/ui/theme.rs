use gpui::{App, Global, Hsla, Pixels, SharedString, px, rgb};
use gpui_component::Theme;

#[derive(Debug, Clone, Copy)]
pub(super) struct ThemeColors {
    pub(super) surface_background: Hsla,
    pub(super) surface_foreground: Hsla,
    pub(super) panel_background: Hsla,
    pub(super) panel_border: Hsla,
    pub(super) panel_active_background: Hsla,
    pub(super) primary: Hsla,
    pub(super) primary_dark: Hsla,
    pub(super) muted_foreground: Hsla,
    pub(super) accent_foreground: Hsla,
    pub(super) success_foreground: Hsla,
    pub(super) error_foreground: Hsla,
    pub(super) progress_foreground: Hsla,
}

#[derive(Debug, Clone)]
pub(super) struct ThemeTypography {
    pub(super) font_family: SharedString,
    pub(super) font_size: Pixels,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct ThemeRadius {
    pub(super) control: Pixels,
    pub(super) panel: Pixels,
}

#[derive(Debug, Clone)]
pub(super) struct PanelTheme {
    pub(super) colors: ThemeColors,
    pub(super) typography: ThemeTypography,
    pub(super) radius: ThemeRadius,
}

impl Default for PanelTheme {
    fn default() -> Self {
        Self {
            colors: ThemeColors {
                surface_background: rgb(0x111827).into(),
                surface_foreground: rgb(0xffffff).into(),
                panel_background: rgb(0x1f2937).into(),
                panel_border: rgb(0x374151).into(),
                panel_active_background: rgb(0x4b5563).into(),
                primary: rgb(0x2563eb).into(),
                primary_dark: rgb(0x3b82f6).into(),
                muted_foreground: rgb(0x9ca3af).into(),
                accent_foreground: rgb(0x93c5fd).into(),
                success_foreground: rgb(0x86efac).into(),
                error_foreground: rgb(0xfca5a5).into(),
                progress_foreground: rgb(0xfbbf24).into(),
            },
            typography: ThemeTypography {
                font_family: ".SystemUIFont".into(),
                font_size: px(16.0),
            },
            radius: ThemeRadius {
                control: px(6.0),
                panel: px(12.0),
            },
        }
    }
}

impl Global for PanelTheme {}

pub(super) fn apply_default_theme(cx: &mut App) {
    let theme = PanelTheme::default();
    apply_to_gpui_component_theme(&theme, cx);
    cx.set_global(theme);
}

fn apply_to_gpui_component_theme(theme: &PanelTheme, cx: &mut App) {
    let component_theme = Theme::global_mut(cx);

    component_theme.font_family = theme.typography.font_family.clone();
    component_theme.font_size = theme.typography.font_size;

    component_theme.radius = theme.radius.control;
    component_theme.radius_lg = theme.radius.panel;

    component_theme.background = theme.colors.surface_background;
    component_theme.foreground = theme.colors.surface_foreground;
    component_theme.border = theme.colors.panel_border;
    component_theme.input = theme.colors.panel_border;

    component_theme.primary = theme.colors.primary;
    component_theme.primary_hover = theme.colors.primary_dark;
    component_theme.primary_active = theme.colors.primary;
    component_theme.primary_foreground = theme.colors.surface_foreground;

    component_theme.secondary = theme.colors.panel_active_background;
    component_theme.secondary_hover = theme.colors.panel_background;
    component_theme.secondary_active = theme.colors.panel_background;
    component_theme.secondary_foreground = theme.colors.surface_foreground;

    component_theme.muted_foreground = theme.colors.muted_foreground;
    component_theme.ring = theme.colors.primary;

    component_theme.slider_bar = theme.colors.primary;
    component_theme.slider_thumb = theme.colors.surface_foreground;
}
