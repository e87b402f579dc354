//! In-memory lending registry: members, catalog items and their copies.
//!
//! All circulation goes through [`Library`] so that copy status and member
//! loans stay consistent: a copy is `on_loan` exactly when one open loan
//! references it.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{
        copy::{CopyStatus, ItemCopy},
        item::Item,
        loan::Loan,
        member::Member,
        policy::LoanPolicy,
    },
};

fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

#[derive(Debug)]
pub struct Library {
    policy: LoanPolicy,
    members: IndexMap<String, Member>,
    /// Keyed by lower-cased title
    items: IndexMap<String, Item>,
    copies: Vec<ItemCopy>,
    next_copy_id: u32,
    next_loan_id: u64,
}

impl Default for Library {
    fn default() -> Self {
        Self::new(LoanPolicy::default())
    }
}

impl Library {
    pub fn new(policy: LoanPolicy) -> Self {
        Self {
            policy,
            members: IndexMap::new(),
            items: IndexMap::new(),
            copies: Vec::new(),
            next_copy_id: 1,
            next_loan_id: 1,
        }
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    // =========================================================================
    // CATALOG
    // =========================================================================

    /// Add `item` unless an item with the same title exists
    pub fn add_item(&mut self, item: Item) -> bool {
        let key = title_key(&item.title);
        if self.items.contains_key(&key) {
            return false;
        }
        self.items.insert(key, item);
        true
    }

    pub fn search_item(&self, title: &str) -> Option<&Item> {
        self.items.get(&title_key(title))
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Create a new copy of the catalog item `title`
    pub fn add_copy(&mut self, title: &str) -> AppResult<&ItemCopy> {
        let item = self
            .search_item(title)
            .ok_or_else(|| AppError::NotFound(format!("Item '{}' not found", title)))?;
        let copy = ItemCopy::new(self.next_copy_id, item.title.clone());
        self.next_copy_id += 1;
        self.copies.push(copy);
        Ok(&self.copies[self.copies.len() - 1])
    }

    pub fn copies(&self) -> &[ItemCopy] {
        &self.copies
    }

    pub fn copies_of(&self, title: &str) -> Vec<&ItemCopy> {
        let key = title_key(title);
        self.copies.iter().filter(|c| title_key(&c.title) == key).collect()
    }

    pub fn search_copy(&self, copy_id: u32) -> Option<&ItemCopy> {
        self.copies.iter().find(|c| c.copy_id == copy_id)
    }

    pub fn available_copies(&self) -> Vec<&ItemCopy> {
        self.copies.iter().filter(|c| c.available()).collect()
    }

    /// Item a copy belongs to
    pub fn item_of(&self, copy: &ItemCopy) -> AppResult<&Item> {
        self.search_item(&copy.title)
            .ok_or_else(|| AppError::Internal(format!("Copy {} has no catalog item", copy.copy_id)))
    }

    fn copy_mut(&mut self, copy_id: u32) -> AppResult<&mut ItemCopy> {
        self.copies
            .iter_mut()
            .find(|c| c.copy_id == copy_id)
            .ok_or(AppError::CopyNotFound(copy_id))
    }

    // =========================================================================
    // MEMBERS
    // =========================================================================

    /// Register `member` unless the id is taken
    pub fn register_member(&mut self, member: Member) -> bool {
        if self.members.contains_key(&member.member_id) {
            return false;
        }
        self.members.insert(member.member_id.clone(), member);
        true
    }

    pub fn remove_member(&mut self, member_id: &str) -> Option<Member> {
        self.members.shift_remove(&Member::normalize_id(member_id))
    }

    pub fn search_member(&self, member_id: &str) -> Option<&Member> {
        self.members.get(&Member::normalize_id(member_id))
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn member(&self, member_id: &str) -> AppResult<&Member> {
        self.search_member(member_id)
            .ok_or_else(|| AppError::MemberNotFound(Member::normalize_id(member_id)))
    }

    fn member_mut(&mut self, member_id: &str) -> AppResult<&mut Member> {
        let id = Member::normalize_id(member_id);
        self.members
            .get_mut(&id)
            .ok_or(AppError::MemberNotFound(id))
    }

    // =========================================================================
    // CIRCULATION
    // =========================================================================

    pub fn borrow(&mut self, member_id: &str, copy_id: u32, date: NaiveDate) -> AppResult<Loan> {
        let id = Member::normalize_id(member_id);
        let member = self
            .members
            .get_mut(&id)
            .ok_or(AppError::MemberNotFound(id))?;
        let copy = self
            .copies
            .iter_mut()
            .find(|c| c.copy_id == copy_id)
            .ok_or(AppError::CopyNotFound(copy_id))?;
        let item = self.items.get(&title_key(&copy.title)).ok_or_else(|| {
            AppError::Internal(format!("Copy {} has no catalog item", copy_id))
        })?;

        let loan = member
            .borrow_item(copy, item, self.next_loan_id, date, &self.policy)?
            .clone();
        self.next_loan_id += 1;
        Ok(loan)
    }

    pub fn renew(&mut self, member_id: &str, title: &str, date: NaiveDate) -> AppResult<Loan> {
        let policy = self.policy.clone();
        let member = self.member_mut(member_id)?;
        Ok(member.renew(title, date, &policy)?.clone())
    }

    /// Return the member's present loan for `title` and release its copy
    pub fn return_item(&mut self, member_id: &str, title: &str, date: NaiveDate) -> AppResult<Loan> {
        let policy = self.policy.clone();
        let loan = self.member_mut(member_id)?.return_item(title, date, &policy)?.clone();
        self.copy_mut(loan.copy_id)?.status = CopyStatus::Available;
        Ok(loan)
    }

    /// Close the member's present loan for `title` as lost and charge the
    /// replacement cost; the copy leaves circulation
    pub fn report_lost(&mut self, member_id: &str, title: &str, date: NaiveDate) -> AppResult<Loan> {
        let loan_title = self
            .member(member_id)?
            .present_loans(Some(title))
            .first()
            .map(|l| l.title.clone());

        let charges = match loan_title.as_deref().and_then(|t| self.search_item(t)) {
            Some(item) => item.lost_charges(&self.policy, date.year())?,
            // no present loan: let the member produce the right error
            None => Decimal::ZERO,
        };

        let loan = self.member_mut(member_id)?.report_lost(title, date, charges)?.clone();
        self.copy_mut(loan.copy_id)?.status = CopyStatus::Lost;
        Ok(loan)
    }

    /// Pay towards a member's fines, returning the change
    pub fn pay(&mut self, member_id: &str, amount: Decimal) -> AppResult<Decimal> {
        self.member_mut(member_id)?.pay(amount)
    }

    // =========================================================================
    // COUNTS
    // =========================================================================

    pub fn open_loans(&self) -> impl Iterator<Item = (&Member, &Loan)> {
        self.members
            .values()
            .flat_map(|m| m.loans.iter().filter(|l| !l.is_returned()).map(move |l| (m, l)))
    }

    pub fn count_active(&self) -> usize {
        self.open_loans().count()
    }

    pub fn count_overdue(&self, today: NaiveDate) -> usize {
        self.open_loans().filter(|(_, l)| l.is_overdue(today)).count()
    }

    pub fn total_owed(&self) -> Decimal {
        self.members
            .values()
            .fold(Decimal::ZERO, |total, m| total.saturating_add(m.amount_owed))
    }

    pub fn copy_line(&self, copy: &ItemCopy) -> String {
        match self.search_item(&copy.title) {
            Some(item) => copy.with_item(item).to_string(),
            None => format!("CopyId: {} {}", copy.copy_id, copy.title),
        }
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in self.items() {
            writeln!(f, "{}", item)?;
        }
        writeln!(f)?;
        for copy in &self.copies {
            writeln!(f, "{}", self.copy_line(copy))?;
        }
        for member in self.members() {
            write!(f, "\n{}\n", member)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::member::MemberKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn library() -> Library {
        let mut library = Library::default();
        library.register_member(Member::standard("S123", "John"));
        library.register_member(Member::junior("J111", "Mary"));
        library.add_item(Item::book(
            "Dark Knight",
            2010,
            Decimal::from(29),
            vec!["Allyson Day".into()],
        ));
        library.add_item(Item::media("Powerpoint Presentation Tips", 2020, Decimal::from(15)));
        library.add_copy("Dark Knight").unwrap();
        library.add_copy("Dark Knight").unwrap();
        library.add_copy("Powerpoint Presentation Tips").unwrap();
        library
    }

    #[test]
    fn test_registry_uniqueness() {
        let mut library = library();
        assert!(!library.add_item(Item::media("dark knight", 2000, Decimal::ONE)));
        assert!(!library.register_member(Member::new("s123", "Other", MemberKind::Junior)));
        assert_eq!(library.members().count(), 2);
        assert_eq!(library.search_member("s123").map(|m| m.name.as_str()), Some("John"));
    }

    #[test]
    fn test_copy_ids_are_sequential() {
        let mut library = library();
        let ids: Vec<u32> = library.copies().iter().map(|c| c.copy_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(library.add_copy("Dark Knight").unwrap().copy_id, 4);
        assert_eq!(library.copies_of("DARK KNIGHT").len(), 3);
        assert!(matches!(library.add_copy("Missing"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_borrow_and_return_toggle_availability() {
        let mut library = library();
        let loan = library.borrow("S123", 1, date(2021, 3, 1)).unwrap();
        assert_eq!(loan.id, 1);
        assert!(!library.search_copy(1).unwrap().available());
        assert_eq!(library.available_copies().len(), 2);
        assert_eq!(library.count_active(), 1);

        let err = library.borrow("J111", 1, date(2021, 3, 2)).unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));

        let loan = library.return_item("S123", "Dark Knight", date(2021, 3, 17)).unwrap();
        assert_eq!(loan.charged, Decimal::new(50, 2));
        assert!(library.search_copy(1).unwrap().available());
        assert_eq!(library.total_owed(), Decimal::new(50, 2));
        assert_eq!(library.count_active(), 0);
    }

    #[test]
    fn test_unknown_member_and_copy() {
        let mut library = library();
        assert!(matches!(
            library.borrow("X999", 1, date(2021, 3, 1)),
            Err(AppError::MemberNotFound(_))
        ));
        assert!(matches!(
            library.borrow("S123", 42, date(2021, 3, 1)),
            Err(AppError::CopyNotFound(42))
        ));
    }

    #[test]
    fn test_report_lost_removes_copy_from_circulation() {
        let mut library = library();
        library.borrow("J111", 3, date(2021, 3, 3)).unwrap();
        let loan = library
            .report_lost("J111", "Powerpoint Presentation Tips", date(2021, 3, 20))
            .unwrap();
        assert!(loan.lost);
        // 1.5 * 15 + 15
        assert_eq!(loan.charged, Decimal::new(375, 1));
        assert_eq!(library.search_copy(3).unwrap().status, CopyStatus::Lost);
        assert!(library.available_copies().iter().all(|c| c.copy_id != 3));

        assert!(matches!(
            library.report_lost("J111", "Powerpoint Presentation Tips", date(2021, 3, 21)),
            Err(AppError::LoanReturned { .. })
        ));
    }

    #[test]
    fn test_lost_book_charge_uses_report_year() {
        let mut library = library();
        library.borrow("S123", 1, date(2014, 12, 20)).unwrap();
        library.borrow("J111", 2, date(2014, 12, 20)).unwrap();

        // four years old in 2014: 0.6 * 29 + 29
        let loan = library.report_lost("J111", "Dark Knight", date(2014, 12, 31)).unwrap();
        assert_eq!(loan.charged, Decimal::new(4640, 2));
        // five years old in 2015: 0.5 * 29 + 29
        let loan = library.report_lost("S123", "Dark Knight", date(2015, 1, 5)).unwrap();
        assert_eq!(loan.charged, Decimal::new(4350, 2));
        assert_eq!(library.total_owed(), Decimal::new(8990, 2));
    }

    #[test]
    fn test_report_lost_before_loan_date() {
        let mut library = library();
        library.borrow("S123", 1, date(2021, 3, 10)).unwrap();
        let loan = library.report_lost("S123", "Dark Knight", date(2021, 3, 1)).unwrap();
        assert_eq!(loan.return_date, Some(date(2021, 3, 10)));
        assert_eq!(library.search_copy(1).unwrap().status, CopyStatus::Lost);
    }

    #[test]
    fn test_report_lost_out_of_range_keeps_loan_open() {
        let mut library = library();
        let cost = Decimal::MAX / Decimal::from(3);
        library.add_item(Item::media("Tape One", 2020, cost));
        library.add_item(Item::media("Tape Two", 2020, cost));
        let first = library.add_copy("Tape One").unwrap().copy_id;
        let second = library.add_copy("Tape Two").unwrap().copy_id;
        library.borrow("S123", first, date(2021, 3, 1)).unwrap();
        library.borrow("S123", second, date(2021, 3, 1)).unwrap();

        library.report_lost("S123", "Tape One", date(2021, 3, 2)).unwrap();
        let owed = library.search_member("S123").unwrap().amount_owed;

        let err = library.report_lost("S123", "Tape Two", date(2021, 3, 2)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(library.search_copy(second).unwrap().status, CopyStatus::OnLoan);
        let john = library.search_member("S123").unwrap();
        assert_eq!(john.amount_owed, owed);
        assert_eq!(john.present_loans(Some("Tape Two")).len(), 1);
    }

    #[test]
    fn test_borrow_past_calendar_end() {
        let mut library = library();
        assert!(matches!(
            library.borrow("S123", 1, NaiveDate::MAX),
            Err(AppError::BadRequest(_))
        ));
        assert!(library.search_copy(1).unwrap().available());
        assert_eq!(library.count_active(), 0);

        let loan = library.borrow("S123", 1, date(2021, 3, 1)).unwrap();
        assert_eq!(loan.id, 1);
    }

    #[test]
    fn test_overdue_count() {
        let mut library = library();
        library.borrow("S123", 1, date(2021, 3, 1)).unwrap();
        library.borrow("J111", 3, date(2021, 3, 3)).unwrap();
        assert_eq!(library.count_overdue(date(2021, 3, 5)), 0);
        assert_eq!(library.count_overdue(date(2021, 3, 10)), 1);
        assert_eq!(library.count_overdue(date(2021, 3, 20)), 2);
    }

    #[test]
    fn test_remove_member() {
        let mut library = library();
        assert_eq!(library.remove_member("j111").map(|m| m.member_id), Some("J111".to_string()));
        assert!(library.remove_member("J111").is_none());
        assert!(library.search_member("J111").is_none());
    }

    #[test]
    fn test_display_lists_items_copies_members() {
        let library = library();
        let text = library.to_string();
        assert!(text.starts_with("Dark Knight 2010 Cost: $29.00 By Allyson Day\n"));
        assert!(text.contains("CopyId: 3 Powerpoint Presentation Tips 2020 Cost: $15.00 Available: True"));
        assert!(text.contains("Id: J111 Mary Owed: $0.00"));
    }
}
