//! 进程内首次安装成功，之后的调用都被拒绝且不替换已安装的 Subscriber。

use waymark_core::logging::{self, LoggingError};

#[test]
fn second_install_is_rejected() {
    logging::install().expect("first install in a fresh process");
    assert!(tracing::dispatcher::has_been_set());

    let err = logging::install().expect_err("already installed");
    assert!(matches!(err, LoggingError::AlreadyInstalled));
    assert_eq!(err.code(), "logging.already_installed");
}
