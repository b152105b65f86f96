//! Call signaling: drives the per-call state machine and relays its events.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bizhub_core::error::{AppError, ErrorKind};
use bizhub_core::traits::{IceCredentialIssuer, IceServer};
use bizhub_core::types::id::{CallId, UserId};
use chrono::Utc;
use serde_json::{Map, Value};

use super::session::{CallSession, CallStatus, CallType};
use crate::connection::manager::ConnectionObserver;
use crate::message::types::{EventKind, InboundEvent};
use crate::metrics::RealtimeMetrics;
use crate::router::EventRouter;

/// Live calls plus a user → call index. A user appears in `by_user` at
/// most once, which is what makes a second initiate busy.
#[derive(Debug, Default)]
struct CallTable {
    calls: HashMap<CallId, CallSession>,
    by_user: HashMap<UserId, CallId>,
}

impl CallTable {
    fn is_busy(&self, user_id: &UserId) -> bool {
        self.by_user.contains_key(user_id)
    }

    fn insert(&mut self, session: CallSession) {
        self.by_user.insert(session.caller_id, session.call_id);
        self.by_user.insert(session.receiver_id, session.call_id);
        self.calls.insert(session.call_id, session);
    }

    fn remove(&mut self, call_id: &CallId) -> Option<CallSession> {
        let session = self.calls.remove(call_id)?;
        for user in [session.caller_id, session.receiver_id] {
            if self.by_user.get(&user) == Some(call_id) {
                self.by_user.remove(&user);
            }
        }
        Some(session)
    }

    fn active_for(&self, user_id: &UserId) -> Option<&CallSession> {
        self.by_user
            .get(user_id)
            .and_then(|call_id| self.calls.get(call_id))
    }

    /// The live call `call_id` as seen by `user_id`, who addressed the
    /// event to `receiver_id`.
    fn participant_call(
        &mut self,
        call_id: &CallId,
        user_id: &UserId,
        receiver_id: &UserId,
    ) -> Result<&mut CallSession, AppError> {
        let session = self
            .calls
            .get_mut(call_id)
            .filter(|session| session.status.is_live())
            .ok_or_else(|| AppError::conflict(format!("Call {call_id} is no longer active")))?;
        if !session.involves(user_id) {
            return Err(AppError::authorization(format!(
                "Not a participant in call {call_id}"
            )));
        }
        if session.other_party(user_id) != Some(*receiver_id) {
            return Err(AppError::validation(
                "receiverId does not match the other call participant",
            ));
        }
        Ok(session)
    }
}

/// Call signaling component.
///
/// The call table lock is never held across an await or while pushing.
pub struct CallSignaling {
    table: Mutex<CallTable>,
    router: Arc<EventRouter>,
    issuer: Arc<dyn IceCredentialIssuer>,
    metrics: Arc<RealtimeMetrics>,
}

impl std::fmt::Debug for CallSignaling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallSignaling")
            .field("active_calls", &self.active_count())
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl CallSignaling {
    pub fn new(
        router: Arc<EventRouter>,
        issuer: Arc<dyn IceCredentialIssuer>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            table: Mutex::new(CallTable::default()),
            router,
            issuer,
            metrics,
        }
    }

    /// Dispatch a submitted call event from `sender_id`.
    pub async fn handle(
        &self,
        sender_id: UserId,
        event: InboundEvent,
    ) -> Result<CallSession, AppError> {
        let receiver_id = event.receiver_id.ok_or_else(|| {
            AppError::validation(format!("receiverId is required for '{}' events", event.kind))
        })?;
        match event.kind {
            EventKind::CallInitiate => self.initiate(sender_id, receiver_id, event.payload).await,
            EventKind::CallAccept => self.accept(sender_id, receiver_id, event.payload),
            EventKind::CallReject => self.reject(sender_id, receiver_id, event.payload),
            EventKind::CallEnd => self.end(sender_id, receiver_id, event.payload),
            EventKind::CallIceCandidate => {
                self.ice_candidate(sender_id, receiver_id, event.payload)
            }
            other => Err(AppError::validation(format!(
                "'{other}' is not a call signaling event"
            ))),
        }
    }

    /// Start ringing `receiver_id`.
    ///
    /// Either party already being in a call is a busy conflict. ICE
    /// servers are fetched before any state is stored, so an issuer
    /// failure leaves nothing behind.
    pub async fn initiate(
        &self,
        caller_id: UserId,
        receiver_id: UserId,
        mut payload: Map<String, Value>,
    ) -> Result<CallSession, AppError> {
        if caller_id == receiver_id {
            return Err(AppError::validation("Cannot call yourself"));
        }
        let call_type = match payload.get("callType").and_then(Value::as_str) {
            Some(raw) => raw.parse::<CallType>()?,
            None => CallType::default(),
        };

        self.ensure_idle(&self.lock(), &caller_id, &receiver_id)?;
        self.ensure_reachable(&caller_id, &receiver_id)?;

        let ice_servers = self
            .issuer
            .ice_servers(&caller_id.to_string())
            .await
            .map_err(|e| {
                tracing::error!(caller_id = %caller_id, error = %e, "ICE credential issuance failed");
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Could not obtain ICE servers, try again",
                    e,
                )
            })?;

        let session = CallSession::ringing(caller_id, receiver_id, call_type, ice_servers);
        {
            let mut table = self.lock();
            // Re-checked: another initiate may have landed during the fetch,
            // or either party may have dropped their last connection.
            self.ensure_idle(&table, &caller_id, &receiver_id)?;
            self.ensure_reachable(&caller_id, &receiver_id)?;
            table.insert(session.clone());
        }
        // A party going offline now either sees the stored call from its
        // observer or is caught here.
        if let Err(e) = self.ensure_reachable(&caller_id, &receiver_id) {
            self.lock().remove(&session.call_id);
            return Err(e);
        }

        payload.insert("callId".into(), Value::String(session.call_id.to_string()));
        payload.insert("callType".into(), Value::String(call_type.as_str().into()));
        payload.insert("iceServers".into(), serde_json::to_value(&session.ice_servers)?);
        self.router
            .deliver(EventKind::CallInitiate, caller_id, receiver_id, payload);
        self.metrics.call_started();

        tracing::info!(
            call_id = %session.call_id,
            caller_id = %caller_id,
            receiver_id = %receiver_id,
            call_type = call_type.as_str(),
            "Call initiated"
        );
        Ok(session)
    }

    /// Callee answers a ringing call.
    pub fn accept(
        &self,
        user_id: UserId,
        receiver_id: UserId,
        payload: Map<String, Value>,
    ) -> Result<CallSession, AppError> {
        let call_id = call_id_of(&payload)?;
        let session = {
            let mut table = self.lock();
            let session = table.participant_call(&call_id, &user_id, &receiver_id)?;
            if session.receiver_id != user_id || session.status != CallStatus::Ringing {
                return Err(AppError::conflict(format!("Call {call_id} cannot be accepted")));
            }
            session.status = CallStatus::Connected;
            session.answered_at = Some(Utc::now());
            session.clone()
        };
        self.router
            .deliver(EventKind::CallAccept, user_id, session.caller_id, payload);
        tracing::info!(call_id = %call_id, "Call accepted");
        Ok(session)
    }

    /// Callee declines a ringing call. The call is cleared.
    pub fn reject(
        &self,
        user_id: UserId,
        receiver_id: UserId,
        payload: Map<String, Value>,
    ) -> Result<CallSession, AppError> {
        let call_id = call_id_of(&payload)?;
        let session = {
            let mut table = self.lock();
            let session = table.participant_call(&call_id, &user_id, &receiver_id)?;
            if session.receiver_id != user_id || session.status != CallStatus::Ringing {
                return Err(AppError::conflict(format!("Call {call_id} cannot be rejected")));
            }
            let mut session = table.remove(&call_id).ok_or_else(|| {
                AppError::conflict(format!("Call {call_id} is no longer active"))
            })?;
            session.finish(CallStatus::Rejected);
            session
        };
        self.router
            .deliver(EventKind::CallReject, user_id, session.caller_id, payload);
        self.metrics.call_finished();
        tracing::info!(call_id = %call_id, "Call rejected");
        Ok(session)
    }

    /// Either party hangs up. The call is cleared.
    pub fn end(
        &self,
        user_id: UserId,
        receiver_id: UserId,
        payload: Map<String, Value>,
    ) -> Result<CallSession, AppError> {
        let call_id = call_id_of(&payload)?;
        let session = {
            let mut table = self.lock();
            table.participant_call(&call_id, &user_id, &receiver_id)?;
            let mut session = table.remove(&call_id).ok_or_else(|| {
                AppError::conflict(format!("Call {call_id} is no longer active"))
            })?;
            session.finish(CallStatus::Ended);
            session
        };
        self.router
            .deliver(EventKind::CallEnd, user_id, receiver_id, payload);
        self.metrics.call_finished();
        tracing::info!(call_id = %call_id, ended_by = %user_id, "Call ended");
        Ok(session)
    }

    /// Pass a trickled ICE candidate or SDP update to the other party.
    pub fn ice_candidate(
        &self,
        user_id: UserId,
        receiver_id: UserId,
        payload: Map<String, Value>,
    ) -> Result<CallSession, AppError> {
        let call_id = call_id_of(&payload)?;
        let session = {
            let mut table = self.lock();
            table
                .participant_call(&call_id, &user_id, &receiver_id)?
                .clone()
        };
        self.router
            .deliver(EventKind::CallIceCandidate, user_id, receiver_id, payload);
        Ok(session)
    }

    /// The call `user_id` is currently part of.
    pub fn active_call(&self, user_id: &UserId) -> Option<CallSession> {
        self.lock().active_for(user_id).cloned()
    }

    pub fn active_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Fresh ICE servers for `user_id` outside of any call.
    pub async fn ice_servers(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<IceServer>, AppError> {
        self.issuer.ice_servers(&user_id.to_string()).await
    }

    /// Clear `user_id`'s call after they lost their last connection and
    /// tell the other party.
    fn drop_participant(&self, user_id: UserId) {
        let session = {
            let mut table = self.lock();
            let Some(call_id) = table.by_user.get(&user_id).copied() else {
                return;
            };
            table.remove(&call_id)
        };
        let Some(mut session) = session else {
            return;
        };
        session.finish(CallStatus::Ended);

        if let Some(other) = session.other_party(&user_id) {
            let mut payload = Map::new();
            payload.insert("callId".into(), Value::String(session.call_id.to_string()));
            payload.insert("reason".into(), Value::String("disconnected".into()));
            self.router
                .deliver(EventKind::CallEnd, user_id, other, payload);
        }
        self.metrics.call_finished();
        tracing::info!(
            call_id = %session.call_id,
            user_id = %user_id,
            "Call ended by disconnect"
        );
    }

    fn ensure_idle(
        &self,
        table: &CallTable,
        caller_id: &UserId,
        receiver_id: &UserId,
    ) -> Result<(), AppError> {
        if table.is_busy(caller_id) {
            return Err(AppError::conflict("You are already in a call"));
        }
        if table.is_busy(receiver_id) {
            return Err(AppError::conflict(format!("User {receiver_id} is busy")));
        }
        Ok(())
    }

    fn ensure_reachable(&self, caller_id: &UserId, receiver_id: &UserId) -> Result<(), AppError> {
        if !self.router.is_online(receiver_id) {
            return Err(AppError::conflict(format!("User {receiver_id} is not available")));
        }
        if !self.router.is_online(caller_id) {
            return Err(AppError::conflict("Open an event stream before calling"));
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, CallTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConnectionObserver for CallSignaling {
    fn user_offline(&self, user_id: UserId) {
        self.drop_participant(user_id);
    }
}

fn call_id_of(payload: &Map<String, Value>) -> Result<CallId, AppError> {
    payload
        .get("callId")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::validation("callId is required"))?
        .parse()
        .map_err(|_| AppError::validation("callId must be a UUID"))
}
