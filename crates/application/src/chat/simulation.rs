/// 业务失败模拟钩子
///
/// 文本恰好等于触发词的消息不会被回显，而是以业务错误状态帧返回，
/// 用于联调客户端对内联错误的处理。设为 [`BusinessFailureSimulation::disabled`] 即可关闭。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessFailureSimulation {
    trigger: Option<String>,
}

pub const DEFAULT_TRIGGER: &str = "error";
pub const SIMULATED_REASON: &str = "some business issues";

impl Default for BusinessFailureSimulation {
    fn default() -> Self {
        Self::on_text(DEFAULT_TRIGGER)
    }
}

impl BusinessFailureSimulation {
    pub fn disabled() -> Self {
        Self { trigger: None }
    }

    /// 空字符串等同于关闭
    pub fn on_text(trigger: impl Into<String>) -> Self {
        let trigger = trigger.into();
        Self {
            trigger: (!trigger.is_empty()).then_some(trigger),
        }
    }

    pub fn triggers(&self, text: &str) -> bool {
        self.trigger.as_deref() == Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_trigger_matches_exact_text_only() {
        let simulation = BusinessFailureSimulation::default();
        assert!(simulation.triggers("error"));
        assert!(!simulation.triggers("error "));
        assert!(!simulation.triggers("Error"));
    }

    #[test]
    fn test_disabled_never_triggers() {
        assert!(!BusinessFailureSimulation::disabled().triggers("error"));
        assert!(!BusinessFailureSimulation::on_text("").triggers(""));
    }
}
