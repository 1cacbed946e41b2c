use std::io;

use async_trait::async_trait;
use schema::{
    is_valid_slot, AirportId, PlaneId, Request, RequestError, RequestHandler, Response, Scheduler,
    NUM_TIME_SLOTS,
};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// An airport node: validates requests addressed to this airport and
/// dispatches them to its scheduler
pub struct AirportNode<S> {
    id: AirportId,
    scheduler: S,
}

impl<S: Scheduler> AirportNode<S> {
    pub fn new(id: AirportId, scheduler: S) -> Self {
        Self { id, scheduler }
    }

    pub fn id(&self) -> AirportId {
        self.id
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Answers a single request line. Always returns a complete response,
    /// terminated by a newline.
    pub fn process(&self, line: &str) -> String {
        match line.parse::<Request>().and_then(|request| self.handle(request)) {
            Ok(response) => response.to_string(),
            Err(e) => {
                log::debug!("airport {} rejected {:?}: {}", self.id, line, e);
                e.to_response()
            }
        }
    }

    pub fn handle(&self, request: Request) -> Result<Response, RequestError> {
        if request.airport() != self.id {
            return Err(RequestError::AirportMismatch {
                requested: request.airport(),
                own: self.id,
            });
        }

        match request {
            Request::Schedule {
                plane,
                earliest,
                duration,
                fuel,
                ..
            } => self.schedule(plane, earliest, duration, fuel),
            Request::PlaneStatus { plane, .. } => Ok(self.plane_status(plane)),
            Request::TimeStatus {
                gate,
                start,
                duration,
                ..
            } => self.time_status(gate, start, duration),
        }
    }

    fn schedule(
        &self,
        plane: PlaneId,
        earliest: i32,
        duration: i32,
        fuel: i32,
    ) -> Result<Response, RequestError> {
        if !is_valid_slot(earliest.into()) {
            return Err(RequestError::InvalidEarliest(earliest));
        }
        if !is_valid_slot(duration.into())
            || !is_valid_slot(i64::from(earliest) + i64::from(duration))
        {
            return Err(RequestError::InvalidDuration(duration));
        }
        let fuel = usize::try_from(fuel).map_err(|_| RequestError::InvalidFuel(fuel))?;

        self.scheduler
            .schedule(plane, earliest as usize, duration as usize, fuel)
            .map(|info| {
                log::info!("airport {} scheduled plane {} at {}", self.id, plane, info);
                Response::Scheduled { plane, info }
            })
            .ok_or(RequestError::CannotSchedule(plane))
    }

    fn plane_status(&self, plane: PlaneId) -> Response {
        match self.scheduler.lookup(plane) {
            Some(info) => Response::PlaneScheduled { plane, info },
            None => Response::PlaneNotScheduled {
                plane,
                airport: self.id,
            },
        }
    }

    fn time_status(&self, gate: i32, start: i32, duration: i32) -> Result<Response, RequestError> {
        let gate_index = usize::try_from(gate)
            .ok()
            .filter(|gate| *gate < self.scheduler.num_gates())
            .ok_or(RequestError::InvalidGate(gate))?;
        if !is_valid_slot(duration.into())
            || i64::from(start) + i64::from(duration) >= NUM_TIME_SLOTS as i64
        {
            return Err(RequestError::InvalidDuration(duration));
        }
        if !is_valid_slot(start.into()) {
            return Err(RequestError::InvalidStart(start));
        }

        let (start, end) = (start as usize, (start + duration) as usize);
        let slots = self
            .scheduler
            .gate_status(gate_index, start, end)
            .ok_or(RequestError::InvalidRequest)?;

        Ok(Response::TimeStatus {
            airport: self.id,
            gate: gate_index,
            start,
            slots,
        })
    }
}

#[async_trait]
impl<S: Scheduler + 'static> RequestHandler for AirportNode<S> {
    async fn respond(
        &self,
        line: &str,
        out: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> io::Result<()> {
        let response = self.process(line);
        out.write_all(response.as_bytes()).await
    }
}
