//! 分发器配置
//!
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// 捕获处理器 panic 并作为失败上报；关闭后 panic 会传播到 `fire` 的调用方
    pub catch_panics: bool,
    /// 事件没有任何处理器时输出 debug 日志
    pub log_unhandled: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            catch_panics: true,
            log_unhandled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: DispatcherConfig = serde_json::from_str(r#"{ "log_unhandled": true }"#).unwrap();
        assert!(cfg.catch_panics);
        assert!(cfg.log_unhandled);

        let cfg: DispatcherConfig = serde_json::from_str("{}").unwrap();
        assert!(cfg.catch_panics);
        assert!(!cfg.log_unhandled);
    }
}
