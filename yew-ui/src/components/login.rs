// SPDX-License-Identifier: MIT OR Apache-2.0

//! Login form.
//!
//! On success the client has already stored the tab's credential pair; this
//! component only reports the login upward so the shell can switch screens.

use classroom_types::LoginResponse;
use log::warn;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use super::api_client;

pub enum Msg {
    UpdateEmail(String),
    UpdatePassword(String),
    ToggleRememberMe,
    Submit,
    LoginSucceeded(LoginResponse),
    LoginFailed(String),
}

#[derive(Properties, PartialEq)]
pub struct LoginProps {
    #[prop_or_default]
    pub on_login: Callback<LoginResponse>,
}

pub struct Login {
    email: String,
    password: String,
    remember_me: bool,
    error: Option<String>,
    busy: bool,
}

impl Component for Login {
    type Message = Msg;
    type Properties = LoginProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            remember_me: false,
            error: None,
            busy: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::UpdateEmail(email) => {
                self.email = email;
                false
            }
            Msg::UpdatePassword(password) => {
                self.password = password;
                false
            }
            Msg::ToggleRememberMe => {
                self.remember_me = !self.remember_me;
                false
            }
            Msg::Submit => {
                if self.busy {
                    return false;
                }
                self.busy = true;
                self.error = None;

                let client = api_client();
                let email = self.email.clone();
                let password = self.password.clone();
                let remember_me = self.remember_me;
                ctx.link().send_future(async move {
                    match client.login(&email, &password, remember_me).await {
                        Ok(response) => Msg::LoginSucceeded(response),
                        Err(err) => Msg::LoginFailed(err.to_string()),
                    }
                });
                true
            }
            Msg::LoginSucceeded(response) => {
                self.busy = false;
                ctx.props().on_login.emit(response);
                true
            }
            Msg::LoginFailed(message) => {
                warn!("login failed: {message}");
                self.busy = false;
                self.error = Some(message);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();

        let on_email = link.callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Msg::UpdateEmail(input.value())
        });
        let on_password = link.callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Msg::UpdatePassword(input.value())
        });
        let on_submit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });

        html! {
            <div class="login-container">
                <div class="login-card">
                    <h1 class="login-title">{ "Classroom" }</h1>

                    <form onsubmit={on_submit}>
                        <input
                            type="email"
                            placeholder="Email"
                            value={self.email.clone()}
                            oninput={on_email}
                        />
                        <input
                            type="password"
                            placeholder="Password"
                            value={self.password.clone()}
                            oninput={on_password}
                        />
                        <label>
                            <input
                                type="checkbox"
                                checked={self.remember_me}
                                onchange={link.callback(|_| Msg::ToggleRememberMe)}
                            />
                            { "Remember me" }
                        </label>
                        <button type="submit" disabled={self.busy}>
                            { if self.busy { "Signing in..." } else { "Sign in" } }
                        </button>
                    </form>

                    if let Some(error) = &self.error {
                        <div class="login-error">{ error }</div>
                    }
                </div>
            </div>
        }
    }
}
