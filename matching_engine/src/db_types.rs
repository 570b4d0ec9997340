use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use log::error;
use mm_common::Credits;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::helpers::fresh_id;

/// Failure reason recorded when a matched pair never responded with choices.
pub const TIMEOUT_NO_RESPONSE: &str = "timeout_no_response";
/// Failure reason recorded when a confirmed pair never met.
pub const TIMEOUT_NO_MEETING: &str = "timeout_no_meeting";
/// Cleanup reason recorded by the retention sweeper.
pub const RETENTION_WINDOW_ELAPSED: &str = "retention window elapsed";

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct ConversionError(String);

//--------------------------------------      RequestId       --------------------------------------------------------
/// A lightweight wrapper around the unique identifier of a matching request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct RequestId(pub String);

impl FromStr for RequestId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------       PairId         --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct PairId(pub String);

impl From<String> for PairId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for PairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PairId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     ProposalId       --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct ProposalId(pub String);

impl From<String> for ProposalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for ProposalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ProposalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------    RequestStatus     --------------------------------------------------------
/// The lifecycle state of a [`MatchingRequest`]. Transitions between states are governed by the
/// table in [`crate::lifecycle`]; nothing outside that table may invent a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Newly created and open to receive a proposal.
    Waiting,
    /// Linked to a partner; waiting for both sides to submit schedule choices.
    Matched,
    /// Both sides agreed on a date and location.
    Confirmed,
    /// The last submission found no overlap; the submitter should try new choices.
    Mismatched,
    /// Reserved: a meeting has been booked by an external scheduler.
    Scheduled,
    /// The pairing ran to completion (or was closed without failure).
    Finished,
    /// The pairing was force-failed, usually by the timeout sweeper.
    Failed,
    /// Both sides exchanged contact details.
    Exchanged,
    /// Terminal record soft-deleted by the retention sweeper.
    Cleaned,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 9] = [
        RequestStatus::Waiting,
        RequestStatus::Matched,
        RequestStatus::Confirmed,
        RequestStatus::Mismatched,
        RequestStatus::Scheduled,
        RequestStatus::Finished,
        RequestStatus::Failed,
        RequestStatus::Exchanged,
        RequestStatus::Cleaned,
    ];

    /// An active request blocks the creation of another request for the same requester.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Waiting | Self::Matched | Self::Confirmed | Self::Mismatched | Self::Scheduled)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Exchanged | Self::Cleaned)
    }
}

impl Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestStatus::Waiting => "Waiting",
            RequestStatus::Matched => "Matched",
            RequestStatus::Confirmed => "Confirmed",
            RequestStatus::Mismatched => "Mismatched",
            RequestStatus::Scheduled => "Scheduled",
            RequestStatus::Finished => "Finished",
            RequestStatus::Failed => "Failed",
            RequestStatus::Exchanged => "Exchanged",
            RequestStatus::Cleaned => "Cleaned",
        };
        write!(f, "{s}")
    }
}

impl FromStr for RequestStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Waiting" => Ok(Self::Waiting),
            "Matched" => Ok(Self::Matched),
            "Confirmed" => Ok(Self::Confirmed),
            "Mismatched" => Ok(Self::Mismatched),
            "Scheduled" => Ok(Self::Scheduled),
            "Finished" => Ok(Self::Finished),
            "Failed" => Ok(Self::Failed),
            "Exchanged" => Ok(Self::Exchanged),
            "Cleaned" => Ok(Self::Cleaned),
            s => Err(ConversionError(format!("Invalid request status: {s}"))),
        }
    }
}

impl From<String> for RequestStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid request status: {value}. But this conversion cannot fail. Defaulting to Waiting");
            RequestStatus::Waiting
        })
    }
}

//--------------------------------------      PairStatus      --------------------------------------------------------
/// The joint state of a [`MatchPair`]. A pair is never owned by a single requester; both sides'
/// lifecycles drive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PairStatus {
    /// Both requests are linked; schedule negotiation is open.
    Matched,
    /// A common date and location was found.
    Confirmed,
    /// Terminal. Set on refusal, timeout, or mutual-interest completion.
    Finished,
    /// Terminal. Both sides submitted reviews carrying contact details.
    Exchanged,
}

impl PairStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Exchanged)
    }
}

impl Display for PairStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PairStatus::Matched => "Matched",
            PairStatus::Confirmed => "Confirmed",
            PairStatus::Finished => "Finished",
            PairStatus::Exchanged => "Exchanged",
        };
        write!(f, "{s}")
    }
}

impl FromStr for PairStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Matched" => Ok(Self::Matched),
            "Confirmed" => Ok(Self::Confirmed),
            "Finished" => Ok(Self::Finished),
            "Exchanged" => Ok(Self::Exchanged),
            s => Err(ConversionError(format!("Invalid pair status: {s}"))),
        }
    }
}

impl From<String> for PairStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid pair status: {value}. But this conversion cannot fail. Defaulting to Matched");
            PairStatus::Matched
        })
    }
}

//--------------------------------------   ProposalStatus     --------------------------------------------------------
/// A proposal resolves exactly once: Propose → Accept or Propose → Refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum ProposalStatus {
    Propose,
    Accept,
    Refuse,
}

impl Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProposalStatus::Propose => "Propose",
            ProposalStatus::Accept => "Accept",
            ProposalStatus::Refuse => "Refuse",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ProposalStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Propose" => Ok(Self::Propose),
            "Accept" => Ok(Self::Accept),
            "Refuse" => Ok(Self::Refuse),
            s => Err(ConversionError(format!("Invalid proposal status: {s}"))),
        }
    }
}

impl From<String> for ProposalStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid proposal status: {value}. But this conversion cannot fail. Defaulting to Propose");
            ProposalStatus::Propose
        })
    }
}

//--------------------------------------  LedgerEntryType     --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum LedgerEntryType {
    /// Debit taken when a matching request is created.
    Spend,
    /// Credit returned when a request fails through no fault of the requester.
    Refund,
    /// Operator-initiated funding of an account.
    Deposit,
}

impl Display for LedgerEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LedgerEntryType::Spend => "Spend",
            LedgerEntryType::Refund => "Refund",
            LedgerEntryType::Deposit => "Deposit",
        };
        write!(f, "{s}")
    }
}

impl FromStr for LedgerEntryType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Spend" => Ok(Self::Spend),
            "Refund" => Ok(Self::Refund),
            "Deposit" => Ok(Self::Deposit),
            s => Err(ConversionError(format!("Invalid ledger entry type: {s}"))),
        }
    }
}

impl From<String> for LedgerEntryType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid ledger entry type: {value}. But this conversion cannot fail. Defaulting to Spend");
            LedgerEntryType::Spend
        })
    }
}

//--------------------------------------     LocationTag      --------------------------------------------------------
/// A candidate meeting location. Either a bare region (`"Seoul"`) or a region with a district
/// (`"Seoul Gangnam"`). Serialised as its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationTag {
    pub region: String,
    pub district: Option<String>,
}

#[derive(Debug, Clone, Error)]
#[error("Invalid location tag: {0}")]
pub struct LocationTagError(String);

impl LocationTag {
    pub fn region(region: &str) -> Self {
        Self { region: region.to_string(), district: None }
    }

    pub fn district(region: &str, district: &str) -> Self {
        Self { region: region.to_string(), district: Some(district.to_string()) }
    }

    /// A tag carrying a district is more specific than a bare region.
    pub fn is_specific(&self) -> bool {
        self.district.is_some()
    }

    /// The hierarchical matching predicate. Two tags match if they are identical, if both carry
    /// districts in the same region, or if one is a bare region equal to the other's region.
    pub fn matches(&self, other: &LocationTag) -> bool {
        self.region == other.region
    }
}

impl FromStr for LocationTag {
    type Err = LocationTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let region = parts.next().ok_or_else(|| LocationTagError(s.to_string()))?.to_string();
        let rest = parts.collect::<Vec<&str>>().join(" ");
        let district = if rest.is_empty() { None } else { Some(rest) };
        Ok(Self { region, district })
    }
}

impl Display for LocationTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.district {
            Some(d) => write!(f, "{} {d}", self.region),
            None => write!(f, "{}", self.region),
        }
    }
}

impl Serialize for LocationTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for LocationTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//--------------------------------------     DateChoices      --------------------------------------------------------
/// One side's candidate dates and locations, stored as a JSON column on the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateChoices {
    pub dates: Vec<NaiveDate>,
    pub locations: Vec<LocationTag>,
}

impl DateChoices {
    pub fn new(dates: Vec<NaiveDate>, locations: Vec<LocationTag>) -> Self {
        Self { dates, locations }
    }
}

//--------------------------------------   MatchingRequest    --------------------------------------------------------
/// One requester's standing intent to be matched, carrying its own negotiation state.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchingRequest {
    pub id: i64,
    pub request_id: RequestId,
    pub requester_id: String,
    pub status: RequestStatus,
    pub date_choices: Option<sqlx::types::Json<DateChoices>>,
    pub choices_submitted_at: Option<DateTime<Utc>>,
    pub final_date: Option<NaiveDate>,
    pub final_location: Option<String>,
    pub photo_visible_at: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
    pub cleanup_reason: Option<String>,
    pub points_refunded: bool,
    pub partner_id: Option<String>,
    pub match_pair_id: Option<PairId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MatchingRequest {
    pub fn choices(&self) -> Option<&DateChoices> {
        self.date_choices.as_ref().map(|j| &j.0)
    }

    pub fn has_submitted_choices(&self) -> bool {
        self.choices_submitted_at.is_some() && self.date_choices.is_some()
    }
}

//--------------------------------------  NewMatchingRequest  --------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewMatchingRequest {
    pub request_id: RequestId,
    pub requester_id: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl NewMatchingRequest {
    pub fn new(requester_id: &str) -> Self {
        Self {
            request_id: RequestId(fresh_id("req")),
            requester_id: requester_id.to_string(),
            status: RequestStatus::Waiting,
            created_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: RequestStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }
}

//--------------------------------------      MatchPair       --------------------------------------------------------
/// The link between two matching requests once introduced. `match_a_id` and `match_b_id` are
/// always two different requests belonging to two different requesters.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchPair {
    pub id: i64,
    pub pair_id: PairId,
    pub match_a_id: RequestId,
    pub match_b_id: RequestId,
    pub status: PairStatus,
    pub confirm_proposed: bool,
    pub contact_shared: bool,
    pub both_interested: bool,
    pub a_wants_again: Option<bool>,
    pub b_wants_again: Option<bool>,
    pub a_contact: Option<String>,
    pub b_contact: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which side of a pair a request occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSide {
    A,
    B,
}

impl MatchPair {
    /// Returns the side occupied by `request_id`, if it belongs to this pair.
    pub fn side_of(&self, request_id: &RequestId) -> Option<PairSide> {
        if &self.match_a_id == request_id {
            Some(PairSide::A)
        } else if &self.match_b_id == request_id {
            Some(PairSide::B)
        } else {
            None
        }
    }

    /// The request id on the other side of the pair.
    pub fn partner_of(&self, request_id: &RequestId) -> Option<&RequestId> {
        match self.side_of(request_id)? {
            PairSide::A => Some(&self.match_b_id),
            PairSide::B => Some(&self.match_a_id),
        }
    }

    pub fn vote_of(&self, side: PairSide) -> Option<bool> {
        match side {
            PairSide::A => self.a_wants_again,
            PairSide::B => self.b_wants_again,
        }
    }

    pub fn contact_of(&self, side: PairSide) -> Option<&String> {
        match side {
            PairSide::A => self.a_contact.as_ref(),
            PairSide::B => self.b_contact.as_ref(),
        }
    }
}

//--------------------------------------     NewMatchPair     --------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewMatchPair {
    pub pair_id: PairId,
    pub match_a_id: RequestId,
    pub match_b_id: RequestId,
    pub confirm_proposed: bool,
    pub created_at: DateTime<Utc>,
}

impl NewMatchPair {
    pub fn new(match_a_id: RequestId, match_b_id: RequestId) -> Self {
        Self {
            pair_id: PairId(fresh_id("pair")),
            match_a_id,
            match_b_id,
            confirm_proposed: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_confirm_proposed(mut self, confirm_proposed: bool) -> Self {
        self.confirm_proposed = confirm_proposed;
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }
}

//--------------------------------------      Proposal        --------------------------------------------------------
/// A one-shot directed introduction offer from `propose_user_id` to `target_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Proposal {
    pub id: i64,
    pub propose_id: ProposalId,
    pub propose_user_id: String,
    pub target_id: String,
    pub match_pair_id: Option<PairId>,
    pub status: ProposalStatus,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProposal {
    pub propose_id: ProposalId,
    pub propose_user_id: String,
    pub target_id: String,
    pub created_at: DateTime<Utc>,
}

impl NewProposal {
    pub fn new(propose_user_id: &str, target_id: &str) -> Self {
        Self {
            propose_id: ProposalId(fresh_id("prop")),
            propose_user_id: propose_user_id.to_string(),
            target_id: target_id.to_string(),
            created_at: Utc::now(),
        }
    }
}

//--------------------------------------    CreditAccount     --------------------------------------------------------
/// A requester's running balance. The balance is the authoritative spendable total; the ledger
/// entries are the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CreditAccount {
    pub requester_id: String,
    pub balance: Credits,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     LedgerEntry      --------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LedgerEntry {
    pub id: i64,
    pub requester_id: String,
    pub entry_type: LedgerEntryType,
    pub amount: Credits,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
