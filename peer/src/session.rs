//! Discovery, role arbitration, and partner liveness.
//!
//! Two freshly booted nodes both broadcast Discovery beacons; whichever
//! node receives the other's beacon first binds the sender as its partner,
//! takes the Master role, and unicasts a YouAreClient override back.
//! Symmetry is broken purely by message arrival order — the beacon nonce is
//! carried but never compared, so if both nodes observe themselves "first"
//! the session ends up with two masters. That conflict is detected later
//! via the claimed-role byte on Input packets and recovered by a full reset
//! back to Searching.
//!
//! Liveness is inferred opportunistically: any packet from the bound
//! partner refreshes the contact clock, and no synthetic keepalive exists.

use log::info;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// A partner is considered gone after this much silence.
pub const PARTNER_TIMEOUT: Duration = Duration::from_millis(5000);
/// Discovery beacon cadence while no partner is bound.
pub const DISCOVERY_INTERVAL: Duration = Duration::from_millis(500);
/// Input report cadence once a partner is bound.
pub const INPUT_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Unknown,
    Master,
    Client,
}

/// Coarse session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Searching,
    Ready,
    Playing,
}

/// Per-node session state: who we are, who our partner is, and whether
/// they are still talking to us.
#[derive(Debug)]
pub struct Session {
    pub role: Role,
    pub phase: Phase,
    /// Generated at boot and sent in Discovery beacons. Reserved for a
    /// deterministic tie-break that the protocol does not currently do.
    pub nonce: u8,
    /// Set when both sides claim the same role; cleared only by the full
    /// reset that follows.
    pub conflict: bool,
    pub local_ready: bool,
    pub remote_ready: bool,
    partner: Option<SocketAddr>,
    last_partner_contact: Instant,
}

impl Session {
    pub fn new(nonce: u8) -> Self {
        Self {
            role: Role::Unknown,
            phase: Phase::Searching,
            nonce,
            conflict: false,
            local_ready: false,
            remote_ready: false,
            partner: None,
            last_partner_contact: Instant::now(),
        }
    }

    pub fn partner(&self) -> Option<SocketAddr> {
        self.partner
    }

    pub fn partner_found(&self) -> bool {
        self.partner.is_some()
    }

    /// Refreshes the liveness clock if the sender is the bound partner.
    pub fn note_contact(&mut self, sender: SocketAddr, now: Instant) {
        if self.partner == Some(sender) {
            self.last_partner_contact = now;
        }
    }

    /// Only meaningful once a partner is bound.
    pub fn is_partner_alive(&self, now: Instant) -> bool {
        now.duration_since(self.last_partner_contact) < PARTNER_TIMEOUT
    }

    /// Handles a Discovery beacon. Returns true if this node just won the
    /// race and became master; the caller must then unicast YouAreClient to
    /// the sender. Beacons arriving after the session is fixed change
    /// nothing.
    pub fn on_discovery(&mut self, sender: SocketAddr, now: Instant) -> bool {
        if self.partner_found() {
            return false;
        }
        self.partner = Some(sender);
        self.last_partner_contact = now;
        self.role = Role::Master;
        self.phase = Phase::Ready;
        info!("Received discovery first from {}, assuming master role", sender);
        true
    }

    /// Handles the YouAreClient override. Binds the sender if no partner is
    /// bound yet, then unconditionally demotes to client — this wins even
    /// over a local in-flight discovery attempt.
    pub fn on_you_are_client(&mut self, sender: SocketAddr, now: Instant) {
        if self.partner.is_none() {
            self.partner = Some(sender);
        }
        self.last_partner_contact = now;
        self.role = Role::Client;
        self.phase = Phase::Ready;
        info!("Received role override from {}, now client", sender);
    }

    /// Compares the partner's claimed role against our own. Both sides
    /// believing they hold the same role marks the session conflicted;
    /// recovery is the caller's full reset.
    pub fn check_role_claim(&mut self, claims_master: bool) -> bool {
        let we_are_master = match self.role {
            Role::Master => true,
            Role::Client => false,
            Role::Unknown => return false,
        };
        if claims_master == we_are_master {
            self.conflict = true;
        }
        self.conflict
    }

    pub fn both_ready(&self) -> bool {
        self.local_ready && self.remote_ready
    }

    /// The two votes are always dropped together.
    pub fn clear_ready_votes(&mut self) {
        self.local_ready = false;
        self.remote_ready = false;
    }

    /// Full recovery path shared by role conflicts and partner timeouts:
    /// back to Searching with no partner, no role, and no votes. The boot
    /// nonce is kept.
    pub fn reset(&mut self, now: Instant) {
        self.role = Role::Unknown;
        self.phase = Phase::Searching;
        self.partner = None;
        self.conflict = false;
        self.clear_ready_votes();
        self.last_partner_contact = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), port)
    }

    #[test]
    fn test_discovery_binds_partner_and_promotes() {
        let mut session = Session::new(7);
        let now = Instant::now();

        assert!(session.on_discovery(addr(9001), now));
        assert_eq!(session.role, Role::Master);
        assert_eq!(session.phase, Phase::Ready);
        assert_eq!(session.partner(), Some(addr(9001)));
    }

    #[test]
    fn test_stale_discovery_changes_nothing() {
        let mut session = Session::new(7);
        let now = Instant::now();
        session.on_discovery(addr(9001), now);

        // A second beacon, even from a different sender, must not rebind.
        assert!(!session.on_discovery(addr(9002), now));
        assert_eq!(session.partner(), Some(addr(9001)));
        assert_eq!(session.role, Role::Master);
        assert_eq!(session.phase, Phase::Ready);
    }

    #[test]
    fn test_you_are_client_always_wins() {
        let mut session = Session::new(7);
        let now = Instant::now();

        // Local race in flight: we already bound the partner as master...
        session.on_discovery(addr(9001), now);
        // ...but the partner's override still forces us to client.
        session.on_you_are_client(addr(9001), now);
        assert_eq!(session.role, Role::Client);
        assert_eq!(session.phase, Phase::Ready);
        assert_eq!(session.partner(), Some(addr(9001)));
    }

    #[test]
    fn test_you_are_client_binds_when_unbound() {
        let mut session = Session::new(7);
        session.on_you_are_client(addr(9001), Instant::now());
        assert!(session.partner_found());
        assert_eq!(session.role, Role::Client);
    }

    #[test]
    fn test_partner_timeout_and_recovery() {
        let mut session = Session::new(7);
        let start = Instant::now();
        session.on_discovery(addr(9001), start);

        assert!(session.is_partner_alive(start + Duration::from_millis(4999)));
        assert!(!session.is_partner_alive(start + PARTNER_TIMEOUT));

        // One packet from the partner restores liveness.
        session.note_contact(addr(9001), start + Duration::from_millis(6000));
        assert!(session.is_partner_alive(start + Duration::from_millis(6001)));
    }

    #[test]
    fn test_contact_from_stranger_ignored() {
        let mut session = Session::new(7);
        let start = Instant::now();
        session.on_discovery(addr(9001), start);

        session.note_contact(addr(9999), start + Duration::from_millis(6000));
        assert!(!session.is_partner_alive(start + Duration::from_millis(6000)));
    }

    #[test]
    fn test_role_conflict_detection() {
        let mut session = Session::new(7);
        session.on_discovery(addr(9001), Instant::now());
        assert_eq!(session.role, Role::Master);

        assert!(!session.check_role_claim(false));
        assert!(!session.conflict);

        // Partner also claims master.
        assert!(session.check_role_claim(true));
        assert!(session.conflict);
    }

    #[test]
    fn test_conflict_as_client() {
        let mut session = Session::new(7);
        session.on_you_are_client(addr(9001), Instant::now());

        assert!(!session.check_role_claim(true));
        assert!(session.check_role_claim(false));
    }

    #[test]
    fn test_claim_ignored_while_role_unknown() {
        let mut session = Session::new(7);
        assert!(!session.check_role_claim(true));
        assert!(!session.check_role_claim(false));
        assert!(!session.conflict);
    }

    #[test]
    fn test_full_reset() {
        let mut session = Session::new(7);
        let now = Instant::now();
        session.on_discovery(addr(9001), now);
        session.local_ready = true;
        session.remote_ready = true;
        session.conflict = true;

        session.reset(now);
        assert_eq!(session.role, Role::Unknown);
        assert_eq!(session.phase, Phase::Searching);
        assert!(!session.partner_found());
        assert!(!session.conflict);
        assert!(!session.local_ready);
        assert!(!session.remote_ready);
        assert_eq!(session.nonce, 7);
    }

    #[test]
    fn test_ready_votes() {
        let mut session = Session::new(7);
        assert!(!session.both_ready());
        session.local_ready = true;
        assert!(!session.both_ready());
        session.remote_ready = true;
        assert!(session.both_ready());
        session.clear_ready_votes();
        assert!(!session.both_ready());
    }
}
