/// Review dashboard state
///
/// Holds the loaded applications and the active filter. Status changes are
/// applied to the local row first and rolled back if the API rejects them;
/// comment edits are applied only after the API accepts them.
///
/// # Example
///
/// ```no_run
/// use techclub_client::{api::ApiClient, dashboard::ReviewBoard};
/// use techclub_shared::models::application::{ApplicationFilter, ApplicationStatus};
///
/// # async fn example() -> Result<(), techclub_client::error::ClientError> {
/// let mut board = ReviewBoard::new(ApiClient::new("http://localhost:3000/api")?);
/// board.refresh(ApplicationFilter::default()).await?;
///
/// board.change_status(12, ApplicationStatus::Approved, "review passphrase").await?;
/// println!("{:?}", board.status_counts());
/// # Ok(())
/// # }
/// ```

use crate::api::ApplicationsApi;
use crate::error::{ClientError, ClientResult};
use techclub_shared::models::application::{
    Application, ApplicationFilter, ApplicationStatus, StatusCounts,
};

pub struct ReviewBoard<A> {
    api: A,
    filter: ApplicationFilter,
    rows: Vec<Application>,
}

impl<A: ApplicationsApi> ReviewBoard<A> {
    pub fn new(api: A) -> Self {
        ReviewBoard {
            api,
            filter: ApplicationFilter::default(),
            rows: Vec::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Loads the rows matching `filter` and makes it the active filter
    pub async fn refresh(&mut self, filter: ApplicationFilter) -> ClientResult<()> {
        self.rows = self.api.list_applications(&filter).await?;
        self.filter = filter;
        Ok(())
    }

    /// Narrows the loaded rows locally without a request
    pub fn set_filter(&mut self, filter: ApplicationFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> &ApplicationFilter {
        &self.filter
    }

    pub fn rows(&self) -> &[Application] {
        &self.rows
    }

    /// Loaded rows that match the active filter
    pub fn visible(&self) -> Vec<&Application> {
        self.rows.iter().filter(|app| self.filter.matches(app)).collect()
    }

    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::tally(self.rows.iter().map(|app| app.status))
    }

    fn position(&self, id: i32) -> ClientResult<usize> {
        self.rows
            .iter()
            .position(|app| app.application_id == id)
            .ok_or(ClientError::UnknownApplication(id))
    }

    /// Changes a row's status optimistically
    ///
    /// # Errors
    ///
    /// - [`ClientError::PasswordRequired`] for an empty passphrase; nothing is sent
    /// - [`ClientError::UnknownApplication`] if the row isn't loaded
    /// - the API error, after the row's original status is restored
    pub async fn change_status(
        &mut self,
        id: i32,
        status: ApplicationStatus,
        password: &str,
    ) -> ClientResult<()> {
        if password.trim().is_empty() {
            return Err(ClientError::PasswordRequired);
        }

        let index = self.position(id)?;
        let original = self.rows[index].status;
        if original == status {
            return Ok(());
        }

        self.rows[index].status = status;

        match self.api.update_status(id, status, password).await {
            Ok(confirmed) => {
                self.rows[index].status = confirmed;
                Ok(())
            }
            Err(e) => {
                tracing::debug!(application_id = id, error = %e, "Status change rolled back");
                self.rows[index].status = original;
                Err(e)
            }
        }
    }

    /// Sets or clears a comment once the API has stored it
    pub async fn edit_comment(&mut self, id: i32, comment: Option<String>) -> ClientResult<()> {
        let index = self.position(id)?;
        let stored = self.api.update_comment(id, comment).await?;
        self.rows[index].comment = stored;
        Ok(())
    }

    /// Deletes an application and drops its row
    pub async fn remove(&mut self, id: i32) -> ClientResult<()> {
        self.api.delete_application(id).await?;
        self.rows.retain(|app| app.application_id != id);
        Ok(())
    }
}
