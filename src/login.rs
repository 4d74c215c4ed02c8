use std::future::Future;
use std::time::Duration;

use log::{info, warn};

use crate::browser::{BrowserLauncher, BrowserSession};
use crate::delay_manager;
use crate::error::{MonitorError, Result};
use crate::session_store::SessionStore;

/// Opens `login_url`, waits for the operator to finish signing in, then stores
/// the resulting cookies after `settle`. Returns the number of cookies saved.
pub async fn capture_session<L, F>(
    launcher: &L,
    store: &SessionStore,
    login_url: &str,
    settle: Duration,
    operator_done: F,
) -> Result<usize>
where
    L: BrowserLauncher,
    F: Future<Output = std::io::Result<()>>,
{
    let mut session = launcher.launch(store.load()).await?;
    let result = async {
        session.navigate(login_url).await?;
        info!("Please log in manually in the browser window...");
        info!("After logging in, press Enter in this console to continue...");
        operator_done.await?;
        delay_manager::pause(settle, "post-login settle").await;
        let cookies = session.cookies().await?;
        store.save(&cookies)?;
        info!("Saved {} cookies to {:?}", cookies.len(), store.path());
        Ok::<usize, MonitorError>(cookies.len())
    }
    .await;

    if let Err(e) = session.close().await {
        warn!("Failed to close browser: {}", e);
    }
    result
}
