use tracing::{debug, warn};

use crate::storage::StorageSession;

use super::errors::SiteError;
use super::traits::SiteRegistry;
use super::types::SiteId;

/// The active-site guard.
///
/// `enter` switches to a site; dropping the scope restores the previous one.
/// If the switch itself fails, `restore` is still called before the error is
/// returned, so every `switch_to` is matched by exactly one `restore`.
pub struct SiteScope<'r> {
    registry: &'r dyn SiteRegistry,
    site_id: SiteId,
    session: Box<dyn StorageSession + 'r>,
}

impl<'r> SiteScope<'r> {
    pub fn enter(registry: &'r dyn SiteRegistry, site_id: SiteId) -> Result<Self, SiteError> {
        debug!(event = "core.sites.switch_started", site_id = site_id);

        match registry.switch_to(site_id) {
            Ok(session) => Ok(Self {
                registry,
                site_id,
                session,
            }),
            Err(e) => {
                registry.restore(site_id);
                warn!(
                    event = "core.sites.switch_failed",
                    site_id = site_id,
                    error = %e
                );
                Err(e)
            }
        }
    }

    pub fn site_id(&self) -> SiteId {
        self.site_id
    }

    pub fn session(&self) -> &dyn StorageSession {
        self.session.as_ref()
    }
}

impl Drop for SiteScope<'_> {
    fn drop(&mut self) {
        self.registry.restore(self.site_id);
        debug!(event = "core.sites.restored", site_id = self.site_id);
    }
}

/// Run `work` with `site_id` active, restoring on every exit path.
pub fn with_site<T, E>(
    registry: &dyn SiteRegistry,
    site_id: SiteId,
    work: impl FnOnce(&dyn StorageSession) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<SiteError>,
{
    let scope = SiteScope::enter(registry, site_id)?;
    work(scope.session())
}
