//! Session bootstrap state machine.
//!
//! After the broker connection comes up the client must set up three
//! subscriptions, strictly one after another, each gated on the previous
//! one being confirmed:
//!
//! ```text
//!  DISCONNECTED ──[connected]──▶ RESPONSE_CHANNEL_PENDING
//!                                   │ [reply topic subscribed]
//!                                   ▼
//!                               RESPONSE_CHANNEL_READY ──▶ OWN_STATE_SUB_PENDING
//!                                                            │ [sub_state reply]
//!                                                            ▼
//!                               OWN_STATE_SUB_READY ──▶ FW_UPDATE_SUB_PENDING
//!                                                            │ [subfw_update reply]
//!                                                            ▼
//!                                                      FW_UPDATE_SUB_READY
//!
//!  Any state ──[disconnected]──▶ DISCONNECTED
//! ```
//!
//! The `*Ready` states before a `*Pending` state are passed through within
//! the same event: entering them sends the next request.
//!
//! [`transition`] is pure.  It returns the states entered, in order, and the
//! actions the session must perform; it never touches the transport.
//!
//! A step whose reply never arrives, or arrives with a failure status,
//! leaves the machine in its `*Pending` state until the next reconnect.
//! There is no timeout and no retry.

use core::fmt;

/// Bootstrap progress of one broker connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BootstrapState {
    #[default]
    Disconnected,
    ResponseChannelPending,
    ResponseChannelReady,
    OwnStateSubPending,
    OwnStateSubReady,
    FwUpdateSubPending,
    FwUpdateSubReady,
}

impl BootstrapState {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::ResponseChannelPending => "ResponseChannelPending",
            Self::ResponseChannelReady => "ResponseChannelReady",
            Self::OwnStateSubPending => "OwnStateSubPending",
            Self::OwnStateSubReady => "OwnStateSubReady",
            Self::FwUpdateSubPending => "FwUpdateSubPending",
            Self::FwUpdateSubReady => "FwUpdateSubReady",
        }
    }

    /// Waiting for a confirmation that has not arrived yet.
    pub const fn is_pending(self) -> bool {
        matches!(
            self,
            Self::ResponseChannelPending | Self::OwnStateSubPending | Self::FwUpdateSubPending
        )
    }

    /// All subscriptions are in place.
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::FwUpdateSubReady)
    }
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Events that can move the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// The broker connection came up (first time or after a reconnect).
    Connected,
    /// The broker connection dropped.
    Disconnected,
    /// The transport confirmed the reply-topic subscription.
    TransportSubscribed,
    /// Success reply to the own-state subscription, with its channel.
    OwnStateAccepted(&'a str),
    /// Success reply to the firmware-update subscription, with its channel.
    FirmwareAccepted(&'a str),
}

/// Side effects the session performs after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    /// Transport-subscribe to the reply topic.
    SubscribeResponseTopic,
    /// Publish the own-state `realtime:subscribe` request.
    RequestOwnStateSubscription,
    /// Publish the firmware-update `realtime:subscribe` request.
    RequestFirmwareSubscription,
    /// Transport-subscribe to a notification channel returned by Kuzzle.
    SubscribeChannel(&'a str),
    /// Bootstrap finished; tell the application.
    NotifyReady,
}

/// Result of feeding one [`Input`] to the machine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transition<'a> {
    /// States entered, in order.  Empty when the state is unchanged.
    pub path: heapless::Vec<BootstrapState, 2>,
    pub actions: heapless::Vec<Action<'a>, 2>,
}

impl<'a> Transition<'a> {
    fn stay() -> Self {
        Self::default()
    }

    fn to(states: &[BootstrapState], actions: &[Action<'a>]) -> Self {
        let mut t = Self::default();
        // Both slices are literals below, within capacity.
        let _ = t.path.extend_from_slice(states);
        let _ = t.actions.extend_from_slice(actions);
        t
    }

    /// State after the transition, given the state before it.
    pub fn target(&self, from: BootstrapState) -> BootstrapState {
        self.path.last().copied().unwrap_or(from)
    }
}

/// The bootstrap transition function.
pub fn transition<'a>(state: BootstrapState, input: Input<'a>) -> Transition<'a> {
    use Action as A;
    use BootstrapState as S;

    match (state, input) {
        // A reconnect re-enters the sequence from the top, whatever we thought
        // the state was.
        (_, Input::Connected) => Transition::to(
            &[S::ResponseChannelPending],
            &[A::SubscribeResponseTopic],
        ),

        (S::Disconnected, Input::Disconnected) => Transition::stay(),
        (_, Input::Disconnected) => Transition::to(&[S::Disconnected], &[]),

        (S::ResponseChannelPending, Input::TransportSubscribed) => Transition::to(
            &[S::ResponseChannelReady, S::OwnStateSubPending],
            &[A::RequestOwnStateSubscription],
        ),
        (_, Input::TransportSubscribed) => Transition::stay(),

        (S::OwnStateSubPending, Input::OwnStateAccepted(channel)) => Transition::to(
            &[S::OwnStateSubReady, S::FwUpdateSubPending],
            &[A::SubscribeChannel(channel), A::RequestFirmwareSubscription],
        ),
        (S::FwUpdateSubPending, Input::FirmwareAccepted(channel)) => Transition::to(
            &[S::FwUpdateSubReady],
            &[A::SubscribeChannel(channel), A::NotifyReady],
        ),

        // Stale reply from before a disconnect.
        (S::Disconnected, Input::OwnStateAccepted(_) | Input::FirmwareAccepted(_)) => {
            Transition::stay()
        }
        // Subscription requested outside the chain: honour the channel, keep
        // the bootstrap where it is.
        (_, Input::OwnStateAccepted(channel) | Input::FirmwareAccepted(channel)) => {
            Transition::to(&[], &[A::SubscribeChannel(channel)])
        }
    }
}
