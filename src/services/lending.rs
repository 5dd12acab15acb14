//! Lending engine: the borrow/return/approve workflow
//!
//! Every operation takes an explicit [`ActingUser`] and runs its guards in a
//! fixed order, so the first failing precondition is the one reported. The
//! engine keeps no state between calls; everything lives behind the
//! [`CatalogStore`] and [`TransactionLedger`] seams.

use std::sync::Arc;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::user::ActingUser,
    repository::{CatalogStore, Repository, TransactionLedger},
};

const NOT_BORROWABLE: &str =
    "The requested book cannot be borrowed since it is not shareable or is archived";
const ALREADY_BORROWED: &str = "The requested book is already borrowed";
const SELF_BORROW: &str = "You cannot borrow your own book";
const SELF_RETURN: &str = "You cannot borrow or return your own book";
const NOT_BORROWED: &str = "You did not borrow this book";
const NOT_RETURNED: &str = "The book is not returned yet. You cannot approve its return";

#[derive(Clone)]
pub struct LendingService {
    catalog: Arc<dyn CatalogStore>,
    ledger: Arc<dyn TransactionLedger>,
    /// See [`LendingConfig::owner_approval_enabled`]: the legacy guard also
    /// rejects the owner on approval, which leaves the approval step
    /// unreachable. Off by default for fidelity with the original rules.
    owner_approval_enabled: bool,
}

impl LendingService {
    pub fn new(repository: Repository, config: &LendingConfig) -> Self {
        Self::with_stores(
            Arc::new(repository.books),
            Arc::new(repository.transactions),
            config,
        )
    }

    /// Build the engine over arbitrary store implementations
    pub fn with_stores(
        catalog: Arc<dyn CatalogStore>,
        ledger: Arc<dyn TransactionLedger>,
        config: &LendingConfig,
    ) -> Self {
        Self {
            catalog,
            ledger,
            owner_approval_enabled: config.owner_approval_enabled,
        }
    }

    async fn find_book(&self, book_id: i32) -> AppResult<crate::models::book::Book> {
        self.catalog
            .find_book_by_id(book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No book found with id {}", book_id)))
    }

    /// Flip the `shareable` flag. Owner only. Returns the new value.
    pub async fn toggle_shareable(&self, book_id: i32, acting: ActingUser) -> AppResult<bool> {
        let mut book = self.find_book(book_id).await?;
        if !book.is_owned_by(acting.id) {
            return Err(AppError::Forbidden(
                "You cannot update another member's book shareable status".to_string(),
            ));
        }
        book.shareable = !book.shareable;
        let saved = self.catalog.save_book(&book).await?;
        tracing::info!(book_id, shareable = saved.shareable, "shareable status toggled");
        Ok(saved.shareable)
    }

    /// Flip the `archived` flag. Owner only. Returns the new value.
    pub async fn toggle_archived(&self, book_id: i32, acting: ActingUser) -> AppResult<bool> {
        let mut book = self.find_book(book_id).await?;
        if !book.is_owned_by(acting.id) {
            return Err(AppError::Forbidden(
                "You cannot update another member's book archived status".to_string(),
            ));
        }
        book.archived = !book.archived;
        let saved = self.catalog.save_book(&book).await?;
        tracing::info!(book_id, archived = saved.archived, "archived status toggled");
        Ok(saved.archived)
    }

    /// Borrow a book, creating an active transaction record.
    ///
    /// The active-pair pre-check races against concurrent borrows; the
    /// ledger's uniqueness constraint settles the race and its violation is
    /// reported identically to the pre-check.
    pub async fn borrow(&self, book_id: i32, acting: ActingUser) -> AppResult<i32> {
        let book = self.find_book(book_id).await?;
        if !book.is_borrowable() {
            return Err(AppError::NotPermitted(NOT_BORROWABLE.to_string()));
        }
        if book.is_owned_by(acting.id) {
            return Err(AppError::NotPermitted(SELF_BORROW.to_string()));
        }
        if self
            .ledger
            .find_active_record(book_id, acting.id)
            .await?
            .is_some()
        {
            return Err(AppError::NotPermitted(ALREADY_BORROWED.to_string()));
        }

        let record = self.ledger.create_record(book_id, acting.id).await?;
        tracing::info!(book_id, user_id = acting.id, record_id = record.id, "book borrowed");
        Ok(record.id)
    }

    /// Return a borrowed book, marking its active record as returned.
    ///
    /// The borrowable guard mirrors `borrow` on purpose, message included;
    /// the original workflow applies it to returns as well.
    pub async fn return_book(&self, book_id: i32, acting: ActingUser) -> AppResult<i32> {
        let book = self.find_book(book_id).await?;
        if !book.is_borrowable() {
            return Err(AppError::NotPermitted(NOT_BORROWABLE.to_string()));
        }
        if book.is_owned_by(acting.id) {
            return Err(AppError::NotPermitted(SELF_RETURN.to_string()));
        }

        let mut record = self
            .ledger
            .find_active_record(book_id, acting.id)
            .await?
            .ok_or_else(|| AppError::NotPermitted(NOT_BORROWED.to_string()))?;

        record.returned = true;
        let saved = self.ledger.save_record(&record).await?;
        tracing::info!(book_id, user_id = acting.id, record_id = saved.id, "book returned");
        Ok(saved.id)
    }

    /// Approve the return of a book the acting user owns.
    ///
    /// The lookup keys on the book's owner, so with the legacy guard active
    /// (owner rejected like a borrower) no caller can ever satisfy both
    /// conditions; `owner_approval_enabled` lets the owner through.
    pub async fn approve_return(&self, book_id: i32, acting: ActingUser) -> AppResult<i32> {
        let book = self.find_book(book_id).await?;
        if !book.is_borrowable() {
            return Err(AppError::NotPermitted(NOT_BORROWABLE.to_string()));
        }
        if book.is_owned_by(acting.id) && !self.owner_approval_enabled {
            return Err(AppError::NotPermitted(SELF_RETURN.to_string()));
        }

        let mut record = self
            .ledger
            .find_returned_unapproved(book_id, acting.id)
            .await?
            .ok_or_else(|| AppError::NotPermitted(NOT_RETURNED.to_string()))?;

        record.return_approved = true;
        let saved = self.ledger.save_record(&record).await?;
        tracing::info!(book_id, owner_id = acting.id, record_id = saved.id, "return approved");
        Ok(saved.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::Book;
    use crate::models::transaction::TransactionRecord;
    use crate::repository::books::MockCatalogStore;
    use crate::repository::transactions::MockTransactionLedger;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn book(id: i32, owner_id: i32, shareable: bool, archived: bool) -> Book {
        Book {
            id,
            owner_id,
            title: "The Left Hand of Darkness".to_string(),
            author_name: "Ursula K. Le Guin".to_string(),
            isbn: "978-0-441-47812-5".to_string(),
            synopsis: None,
            shareable,
            archived,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn record(id: i32, book_id: i32, user_id: i32, returned: bool) -> TransactionRecord {
        TransactionRecord {
            id,
            book_id,
            user_id,
            returned,
            return_approved: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn engine(
        catalog: MockCatalogStore,
        ledger: MockTransactionLedger,
        owner_approval_enabled: bool,
    ) -> LendingService {
        LendingService::with_stores(
            Arc::new(catalog),
            Arc::new(ledger),
            &LendingConfig { owner_approval_enabled },
        )
    }

    #[tokio::test]
    async fn toggle_shareable_by_owner_flips_and_flips_back() {
        // stateful catalog so the second toggle sees the first one's write
        let state = Arc::new(std::sync::Mutex::new(book(1, 10, false, false)));
        let mut catalog = MockCatalogStore::new();
        catalog.expect_find_book_by_id().with(eq(1)).times(2).returning({
            let state = state.clone();
            move |_| Ok(Some(state.lock().unwrap().clone()))
        });
        catalog.expect_save_book().times(2).returning({
            let state = state.clone();
            move |b| {
                *state.lock().unwrap() = b.clone();
                Ok(b.clone())
            }
        });

        let svc = engine(catalog, MockTransactionLedger::new(), false);
        let first = svc.toggle_shareable(1, ActingUser::new(10)).await.unwrap();
        assert!(first);
        let second = svc.toggle_shareable(1, ActingUser::new(10)).await.unwrap();
        assert!(!second);
    }

    #[tokio::test]
    async fn toggle_shareable_by_non_owner_is_forbidden() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, false))));
        catalog.expect_save_book().times(0);

        let svc = engine(catalog, MockTransactionLedger::new(), false);
        let err = svc.toggle_shareable(1, ActingUser::new(11)).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn toggle_archived_by_non_owner_is_forbidden() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, false))));
        catalog.expect_save_book().times(0);

        let svc = engine(catalog, MockTransactionLedger::new(), false);
        let err = svc.toggle_archived(1, ActingUser::new(11)).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn toggle_archived_by_owner_returns_new_value() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, false))));
        catalog.expect_save_book().returning(|b| Ok(b.clone()));

        let svc = engine(catalog, MockTransactionLedger::new(), false);
        let archived = svc.toggle_archived(1, ActingUser::new(10)).await.unwrap();
        assert!(archived);
    }

    #[tokio::test]
    async fn borrow_missing_book_is_not_found() {
        let mut catalog = MockCatalogStore::new();
        catalog.expect_find_book_by_id().with(eq(999)).returning(|_| Ok(None));

        let svc = engine(catalog, MockTransactionLedger::new(), false);
        let err = svc.borrow(999, ActingUser::new(1)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn borrow_archived_book_is_rejected_before_ownership() {
        let mut catalog = MockCatalogStore::new();
        // archived wins even though the book is shareable and owned by the caller
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, true))));
        let mut ledger = MockTransactionLedger::new();
        ledger.expect_create_record().times(0);

        let svc = engine(catalog, ledger, false);
        let err = svc.borrow(1, ActingUser::new(10)).await.unwrap_err();
        assert!(matches!(err, AppError::NotPermitted(ref m) if m.contains("not shareable or is archived")));
    }

    #[tokio::test]
    async fn borrow_unshareable_book_is_rejected() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, false, false))));

        let svc = engine(catalog, MockTransactionLedger::new(), false);
        let err = svc.borrow(1, ActingUser::new(2)).await.unwrap_err();
        assert!(matches!(err, AppError::NotPermitted(_)));
    }

    #[tokio::test]
    async fn borrow_own_book_is_rejected_without_ledger_write() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, false))));
        let mut ledger = MockTransactionLedger::new();
        ledger.expect_find_active_record().times(0);
        ledger.expect_create_record().times(0);

        let svc = engine(catalog, ledger, false);
        let err = svc.borrow(1, ActingUser::new(10)).await.unwrap_err();
        assert!(matches!(err, AppError::NotPermitted(ref m) if m.contains("your own book")));
    }

    #[tokio::test]
    async fn borrow_twice_is_rejected() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, false))));
        let mut ledger = MockTransactionLedger::new();
        ledger
            .expect_find_active_record()
            .with(eq(1), eq(2))
            .returning(|book_id, user_id| Ok(Some(record(7, book_id, user_id, false))));
        ledger.expect_create_record().times(0);

        let svc = engine(catalog, ledger, false);
        let err = svc.borrow(1, ActingUser::new(2)).await.unwrap_err();
        assert!(matches!(err, AppError::NotPermitted(ref m) if m.contains("already borrowed")));
    }

    #[tokio::test]
    async fn borrow_creates_active_record() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, false))));
        let mut ledger = MockTransactionLedger::new();
        ledger.expect_find_active_record().returning(|_, _| Ok(None));
        ledger
            .expect_create_record()
            .with(eq(1), eq(2))
            .returning(|book_id, user_id| Ok(record(42, book_id, user_id, false)));

        let svc = engine(catalog, ledger, false);
        let id = svc.borrow(1, ActingUser::new(2)).await.unwrap();
        assert_eq!(id, 42);
    }

    #[tokio::test]
    async fn borrow_losing_the_race_reports_already_borrowed() {
        // the pre-check saw no active record, but the ledger's uniqueness
        // constraint caught a concurrent borrow on insert
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, false))));
        let mut ledger = MockTransactionLedger::new();
        ledger.expect_find_active_record().returning(|_, _| Ok(None));
        ledger.expect_create_record().returning(|_, _| {
            Err(AppError::NotPermitted(
                "The requested book is already borrowed".to_string(),
            ))
        });

        let svc = engine(catalog, ledger, false);
        let err = svc.borrow(1, ActingUser::new(2)).await.unwrap_err();
        assert!(matches!(err, AppError::NotPermitted(ref m) if m.contains("already borrowed")));
    }

    #[tokio::test]
    async fn return_without_borrow_is_rejected() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, false))));
        let mut ledger = MockTransactionLedger::new();
        ledger.expect_find_active_record().returning(|_, _| Ok(None));
        ledger.expect_save_record().times(0);

        let svc = engine(catalog, ledger, false);
        let err = svc.return_book(1, ActingUser::new(2)).await.unwrap_err();
        assert!(matches!(err, AppError::NotPermitted(ref m) if m.contains("did not borrow")));
    }

    #[tokio::test]
    async fn return_own_book_is_rejected() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, false))));

        let svc = engine(catalog, MockTransactionLedger::new(), false);
        let err = svc.return_book(1, ActingUser::new(10)).await.unwrap_err();
        assert!(matches!(err, AppError::NotPermitted(ref m) if m.contains("borrow or return")));
    }

    #[tokio::test]
    async fn return_marks_record_returned() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, false))));
        let mut ledger = MockTransactionLedger::new();
        ledger
            .expect_find_active_record()
            .with(eq(1), eq(2))
            .returning(|book_id, user_id| Ok(Some(record(7, book_id, user_id, false))));
        ledger
            .expect_save_record()
            .withf(|r| r.returned && !r.return_approved)
            .returning(|r| Ok(r.clone()));

        let svc = engine(catalog, ledger, false);
        let id = svc.return_book(1, ActingUser::new(2)).await.unwrap();
        assert_eq!(id, 7);
    }

    #[tokio::test]
    async fn approve_by_owner_fails_under_legacy_guard() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, false))));
        let mut ledger = MockTransactionLedger::new();
        ledger.expect_find_returned_unapproved().times(0);

        let svc = engine(catalog, ledger, false);
        let err = svc.approve_return(1, ActingUser::new(10)).await.unwrap_err();
        assert!(matches!(err, AppError::NotPermitted(ref m) if m.contains("borrow or return")));
    }

    #[tokio::test]
    async fn approve_by_non_owner_finds_no_record() {
        // a non-owner passes the guard but the owner-keyed lookup is empty
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, false))));
        let mut ledger = MockTransactionLedger::new();
        ledger
            .expect_find_returned_unapproved()
            .with(eq(1), eq(2))
            .returning(|_, _| Ok(None));

        let svc = engine(catalog, ledger, false);
        let err = svc.approve_return(1, ActingUser::new(2)).await.unwrap_err();
        assert!(matches!(err, AppError::NotPermitted(ref m) if m.contains("not returned yet")));
    }

    #[tokio::test]
    async fn approve_by_owner_succeeds_when_enabled() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, false))));
        let mut ledger = MockTransactionLedger::new();
        ledger
            .expect_find_returned_unapproved()
            .with(eq(1), eq(10))
            .returning(|book_id, _| Ok(Some(record(7, book_id, 2, true))));
        ledger
            .expect_save_record()
            .withf(|r| r.returned && r.return_approved)
            .returning(|r| Ok(r.clone()));

        let svc = engine(catalog, ledger, true);
        let id = svc.approve_return(1, ActingUser::new(10)).await.unwrap();
        assert_eq!(id, 7);
    }

    #[tokio::test]
    async fn approve_twice_is_rejected() {
        // once approved, the record no longer matches the unapproved lookup
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, false))));
        let mut ledger = MockTransactionLedger::new();
        ledger
            .expect_find_returned_unapproved()
            .returning(|_, _| Ok(None));

        let svc = engine(catalog, ledger, true);
        let err = svc.approve_return(1, ActingUser::new(10)).await.unwrap_err();
        assert!(matches!(err, AppError::NotPermitted(ref m) if m.contains("not returned yet")));
    }

    #[tokio::test]
    async fn full_lifecycle_runs_through_all_stages() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_book_by_id()
            .returning(|_| Ok(Some(book(1, 10, true, false))));

        let mut ledger = MockTransactionLedger::new();
        // borrow: no active record yet
        ledger
            .expect_find_active_record()
            .with(eq(1), eq(2))
            .times(1)
            .returning(|_, _| Ok(None));
        ledger
            .expect_create_record()
            .times(1)
            .returning(|book_id, user_id| Ok(record(7, book_id, user_id, false)));
        // return: the active record is found again
        ledger
            .expect_find_active_record()
            .with(eq(1), eq(2))
            .returning(|book_id, user_id| Ok(Some(record(7, book_id, user_id, false))));
        // approve: lookup keyed on the owner
        ledger
            .expect_find_returned_unapproved()
            .with(eq(1), eq(10))
            .returning(|book_id, _| Ok(Some(record(7, book_id, 2, true))));
        ledger.expect_save_record().returning(|r| Ok(r.clone()));

        let svc = engine(catalog, ledger, true);
        let borrower = ActingUser::new(2);
        let owner = ActingUser::new(10);

        assert_eq!(svc.borrow(1, borrower).await.unwrap(), 7);
        assert_eq!(svc.return_book(1, borrower).await.unwrap(), 7);
        assert_eq!(svc.approve_return(1, owner).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn return_missing_book_is_not_found() {
        let mut catalog = MockCatalogStore::new();
        catalog.expect_find_book_by_id().returning(|_| Ok(None));

        let svc = engine(catalog, MockTransactionLedger::new(), false);
        let err = svc.return_book(404, ActingUser::new(2)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
