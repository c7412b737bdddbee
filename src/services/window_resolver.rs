use crate::debug_if_enabled;
use crate::events::{ResolvedTarget, WindowId};
use crate::services::windowing::WindowingProtocol;
use std::sync::Arc;

/// Предел глубины дерева окон; защищает от циклов в ответах протокола
const MAX_TREE_DEPTH: usize = 64;

/// WindowResolver maps the window reported by a gesture event to the window
/// the window manager actually tracks, plus its application class.
///
/// Read-only and stateless: every call goes to the protocol, and every protocol
/// failure becomes "no information" (`None` or an empty class).
#[derive(Clone)]
pub struct WindowResolver {
    protocol: Arc<dyn WindowingProtocol>,
}

impl WindowResolver {
    pub fn new(protocol: Arc<dyn WindowingProtocol>) -> Self {
        Self { protocol }
    }

    /// Подняться по родителям до прямого потомка корня
    pub fn top_level_window_of(&self, window: WindowId) -> Option<WindowId> {
        let root = self.protocol.root_window().ok()?;
        if window == root {
            return Some(root);
        }

        let mut current = window;
        for _ in 0..MAX_TREE_DEPTH {
            match self.protocol.parent_of(current) {
                Ok(Some(parent)) if parent == root => return Some(current),
                Ok(Some(parent)) => current = parent,
                Ok(None) | Err(_) => {
                    debug_if_enabled!("Не удалось получить родителя окна {}", current);
                    return None;
                }
            }
        }

        debug_if_enabled!("Дерево окон над {} глубже {} уровней", window, MAX_TREE_DEPTH);
        None
    }

    /// Окно из списка `_NET_CLIENT_LIST_STACKING` с тем же окном верхнего уровня
    pub fn application_window_for(&self, window: WindowId) -> Option<WindowId> {
        let top_level = self.top_level_window_of(window)?;
        let stacking = self.protocol.stacking_order().ok()?;

        stacking
            .into_iter()
            .find(|candidate| self.top_level_window_of(*candidate) == Some(top_level))
    }

    /// Класс приложения; пустая строка, если подсказка недоступна
    pub fn class_name_of(&self, window: WindowId) -> String {
        self.protocol
            .class_hint(window)
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Цель действия для окна из атрибутов события
    pub fn resolve(&self, child_window: Option<WindowId>) -> ResolvedTarget {
        let Some(window) = child_window.and_then(|w| self.application_window_for(w)) else {
            return ResolvedTarget::none();
        };
        ResolvedTarget::new(Some(window), self.class_name_of(window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::windowing::DryRunProtocol;

    const ROOT: WindowId = WindowId(1);
    const FRAME: WindowId = WindowId(0x200);
    const CLIENT: WindowId = WindowId(0x201);
    const INPUT: WindowId = WindowId(0x202);
    const OTHER_FRAME: WindowId = WindowId(0x300);
    const ORPHAN_FRAME: WindowId = WindowId(0x400);
    const ORPHAN_CHILD: WindowId = WindowId(0x401);

    fn resolver() -> WindowResolver {
        let protocol = DryRunProtocol::new(ROOT)
            .with_window(FRAME, ROOT, None)
            .with_window(CLIENT, FRAME, Some("Firefox"))
            .with_window(INPUT, CLIENT, None)
            .with_window(OTHER_FRAME, ROOT, Some("XTerm"))
            .with_window(ORPHAN_FRAME, ROOT, None)
            .with_window(ORPHAN_CHILD, ORPHAN_FRAME, None)
            .with_stacking(vec![OTHER_FRAME, CLIENT]);
        WindowResolver::new(Arc::new(protocol))
    }

    #[test]
    fn test_top_level_of_root_is_root() {
        assert_eq!(resolver().top_level_window_of(ROOT), Some(ROOT));
    }

    #[test]
    fn test_top_level_walks_to_root_child() {
        let resolver = resolver();
        assert_eq!(resolver.top_level_window_of(INPUT), Some(FRAME));
        assert_eq!(resolver.top_level_window_of(FRAME), Some(FRAME));
    }

    #[test]
    fn test_top_level_of_unknown_window_is_none() {
        assert_eq!(resolver().top_level_window_of(WindowId(0xdead)), None);
    }

    #[test]
    fn test_top_level_terminates_on_cycle() {
        let protocol = DryRunProtocol::new(ROOT)
            .with_window(WindowId(10), WindowId(11), None)
            .with_window(WindowId(11), WindowId(10), None);
        let resolver = WindowResolver::new(Arc::new(protocol));
        assert_eq!(resolver.top_level_window_of(WindowId(10)), None);
    }

    #[test]
    fn test_application_window_matches_stacking_entry() {
        let resolver = resolver();
        assert_eq!(resolver.application_window_for(INPUT), Some(CLIENT));
        assert_eq!(resolver.application_window_for(OTHER_FRAME), Some(OTHER_FRAME));
    }

    #[test]
    fn test_application_window_absent_from_stacking_is_none() {
        assert_eq!(resolver().application_window_for(ORPHAN_CHILD), None);
    }

    #[test]
    fn test_resolve_target() {
        let resolver = resolver();
        let target = resolver.resolve(Some(INPUT));
        assert_eq!(target, ResolvedTarget::new(Some(CLIENT), "Firefox".to_string()));

        assert_eq!(resolver.resolve(None), ResolvedTarget::none());
        assert_eq!(resolver.resolve(Some(ORPHAN_CHILD)), ResolvedTarget::none());
    }

    #[test]
    fn test_class_name_of_unknown_window_is_empty() {
        assert_eq!(resolver().class_name_of(WindowId(0xdead)), "");
        assert_eq!(resolver().class_name_of(FRAME), "");
    }
}
