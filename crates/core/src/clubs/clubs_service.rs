use async_trait::async_trait;
use log::{debug, info};
use std::collections::HashSet;
use std::sync::Arc;

use super::clubs_model::{Club, Fund, FundSplit, NewClub, NewFund, NewFundSplit};
use super::clubs_traits::{ClubRepositoryTrait, ClubServiceTrait};
use super::fund_split_distributor::validate_splits;
use crate::errors::{Error, LedgerError, Result};

/// Service for club, fund and split administration.
pub struct ClubService {
    repository: Arc<dyn ClubRepositoryTrait>,
}

impl ClubService {
    pub fn new(repository: Arc<dyn ClubRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ClubServiceTrait for ClubService {
    async fn create_club(&self, new_club: NewClub) -> Result<Club> {
        new_club.validate()?;
        let club = self.repository.create_club(new_club).await?;
        info!("Created club {} ({})", club.name, club.id);
        Ok(club)
    }

    fn get_club(&self, club_id: &str) -> Result<Club> {
        self.repository.get_club(club_id)
    }

    fn list_clubs(&self) -> Result<Vec<Club>> {
        self.repository.list_clubs()
    }

    async fn create_fund(&self, new_fund: NewFund) -> Result<Fund> {
        new_fund.validate()?;
        // Fails with NotFound when the club does not exist.
        self.repository.get_club(&new_fund.club_id)?;
        let fund = self.repository.create_fund(new_fund).await?;
        info!("Created fund {} ({}) in club {}", fund.name, fund.id, fund.club_id);
        Ok(fund)
    }

    fn get_fund(&self, club_id: &str, fund_id: &str) -> Result<Fund> {
        let fund = self.repository.get_fund(fund_id)?;
        if fund.club_id != club_id {
            return Err(Error::not_found("Fund", fund_id));
        }
        Ok(fund)
    }

    fn list_funds(&self, club_id: &str) -> Result<Vec<Fund>> {
        self.repository.get_club(club_id)?;
        self.repository.list_funds(club_id)
    }

    async fn set_fund_active(
        &self,
        club_id: &str,
        fund_id: &str,
        is_active: bool,
    ) -> Result<Fund> {
        self.get_fund(club_id, fund_id)?;
        if !is_active {
            let splits = self.repository.list_fund_splits(club_id)?;
            if splits.iter().any(|s| s.fund_id == fund_id) {
                return Err(LedgerError::InvalidSplitConfiguration(format!(
                    "fund {} is part of the split configuration; remove it before deactivating",
                    fund_id
                ))
                .into());
            }
        }
        self.repository.set_fund_active(fund_id, is_active).await
    }

    async fn set_fund_splits(
        &self,
        club_id: &str,
        splits: Vec<NewFundSplit>,
    ) -> Result<Vec<FundSplit>> {
        self.repository.get_club(club_id)?;

        let mut seen = HashSet::new();
        for split in &splits {
            if !seen.insert(split.fund_id.as_str()) {
                return Err(LedgerError::InvalidSplitConfiguration(format!(
                    "fund {} appears more than once",
                    split.fund_id
                ))
                .into());
            }
            let fund = self.get_fund(club_id, &split.fund_id)?;
            if !fund.is_active {
                return Err(LedgerError::InvalidSplitConfiguration(format!(
                    "fund {} is inactive",
                    fund.id
                ))
                .into());
            }
        }

        let splits: Vec<FundSplit> = splits
            .into_iter()
            .map(|s| FundSplit {
                club_id: club_id.to_string(),
                fund_id: s.fund_id,
                split_percentage: s.split_percentage,
            })
            .collect();

        if splits.is_empty() {
            debug!("Clearing fund splits for club {}", club_id);
        } else {
            validate_splits(&splits)?;
        }

        self.repository.replace_fund_splits(club_id, splits).await
    }

    fn get_fund_splits(&self, club_id: &str) -> Result<Vec<FundSplit>> {
        self.repository.list_fund_splits(club_id)
    }
}
