//! 界面上下文：主题与侧边栏
//!
//! 两者都是显式的 Context 对象，在 `App` 根部创建。
//! 主题偏好持久化到 LocalStorage；侧边栏开合只保存在内存中。

use leptos::prelude::*;
use ongchad_shared::preferences::{load_dark_mode, save_dark_mode};

use crate::web::BrowserStorage;

const THEME_DARK: &str = "dark";
const THEME_LIGHT: &str = "light";

/// 主题上下文
#[derive(Clone, Copy)]
pub struct ThemeContext {
    pub dark: RwSignal<bool>,
}

impl ThemeContext {
    /// 读取持久化的偏好并同步到 `<html data-theme>`
    pub fn new() -> Self {
        let ctx = Self {
            dark: RwSignal::new(load_dark_mode(&BrowserStorage)),
        };
        let dark = ctx.dark;
        Effect::new(move |_| apply_theme(dark.get()));
        ctx
    }

    pub fn toggle(&self) {
        let enabled = !self.dark.get_untracked();
        save_dark_mode(&BrowserStorage, enabled);
        self.dark.set(enabled);
    }
}

impl Default for ThemeContext {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_theme(dark: bool) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };
    let theme = if dark { THEME_DARK } else { THEME_LIGHT };
    if let Err(e) = root.set_attribute("data-theme", theme) {
        tracing::warn!(error = ?e, "failed to apply theme");
    }
}

/// 侧边栏上下文（移动端抽屉）
#[derive(Clone, Copy)]
pub struct SidebarContext {
    pub open: RwSignal<bool>,
}

impl SidebarContext {
    pub fn new() -> Self {
        Self {
            open: RwSignal::new(false),
        }
    }

    pub fn toggle(&self) {
        self.open.update(|open| *open = !*open);
    }

    pub fn close(&self) {
        self.open.set(false);
    }
}

impl Default for SidebarContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_theme() -> ThemeContext {
    expect_context::<ThemeContext>()
}

pub fn use_sidebar() -> SidebarContext {
    expect_context::<SidebarContext>()
}
